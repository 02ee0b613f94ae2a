//! Subscriber setup for the estimator.
//!
//! Records go to stderr, so command output on stdout stays machine-readable,
//! and optionally to an append-mode log file. The level can be changed after
//! startup through [`set_log_level`].

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

// ── formatter ────────────────────────────────────────────────────────────

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

fn level_style(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[36m",
        Level::TRACE => "\x1b[35m",
    }
}

/// `HH:MM:SS.mmm LEVEL target: fields` in local time. Span context is
/// omitted; the estimator logs flat events.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let time = Local::now().format("%H:%M:%S%.3f");
        let level = *meta.level();

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "{DIM}{time}{RESET} {}{level:<5}{RESET} {DIM}{}:{RESET} ",
                level_style(level),
                meta.target()
            )?;
        } else {
            write!(writer, "{time} {level:<5} {}: ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ── log file ─────────────────────────────────────────────────────────────

/// Writer that appends to the configured log file, or discards when none is set.
#[derive(Clone)]
struct FileSlot(Arc<Mutex<Option<File>>>);

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match &mut *self.0 {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.0 {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// ── statics ──────────────────────────────────────────────────────────────

type SetLevelFn = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;

static SET_LOG_LEVEL: OnceLock<SetLevelFn> = OnceLock::new();

/// `RUST_LOG` wins over the configured level.
fn make_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'")),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

// ── public API ───────────────────────────────────────────────────────────

/// Installs the global subscriber. Call once at startup; later calls are
/// ignored.
///
/// `level` is a bare level (`"warn"`) or any `EnvFilter` directive.
pub fn init_logging(
    level: &str,
    file: Option<&Path>,
) -> Result<()> {
    let file = file.map(open_log_file).transpose()?;
    let (level_filter, level_handle) = reload::Layer::new(make_filter(level)?);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(FileSlot(Arc::new(Mutex::new(file))));

    if tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        let _ = SET_LOG_LEVEL.set(Box::new(move |level: &str| {
            let filter = EnvFilter::try_new(level)
                .with_context(|| format!("invalid log level '{level}'"))?;
            level_handle
                .reload(filter)
                .context("filter reload failed")
        }));
    }
    Ok(())
}

/// Changes the active log filter at runtime.
pub fn set_log_level(level: &str) -> Result<()> {
    match SET_LOG_LEVEL.get() {
        Some(f) => f(level),
        None => anyhow::bail!("logging not yet initialized"),
    }
}

/// Logs a background task failure with context.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, ?error, "background task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this binary that installs the global subscriber.
    #[test]
    fn level_can_be_changed_after_init() {
        init_logging("warn", None).unwrap();

        assert!(set_log_level("debug").is_ok());
        assert!(set_log_level("lease_core=info,lease_app=trace").is_ok());
        assert!(set_log_level("lease_core=loud").is_err());
    }

    #[test]
    fn log_task_error_accepts_ok_and_err() {
        log_task_error("ok-task", Ok(()));
        log_task_error("failing-task", Err(anyhow::anyhow!("boom")));
    }
}
