use std::sync::Arc;

use anyhow::{Context, Result};
use lease_core::{
    CreditResolver, CreditTier, LiveDataOverlay, MileageAllowance, ReferenceTables,
};
use lease_data::{FileIncentiveFeed, ReferenceTableLoader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Everything a quote needs: the static tables, the live overlay and the
/// configured defaults. Cheap to clone; both data sources are shared.
#[derive(Debug, Clone)]
pub struct Estimator {
    pub tables: Arc<ReferenceTables>,
    pub overlay: Arc<LiveDataOverlay>,
    pub default_tier: CreditTier,
    pub default_mileage: MileageAllowance,
}

impl Estimator {
    pub fn new(
        tables: ReferenceTables,
        overlay: LiveDataOverlay,
    ) -> Self {
        Self {
            tables: Arc::new(tables),
            overlay: Arc::new(overlay),
            default_tier: CreditTier::default(),
            default_mileage: MileageAllowance(12000),
        }
    }

    /// Loads reference tables and wires the incentive feed described by
    /// `config`. The overlay starts empty; see [`Estimator::spawn_overlay_population`].
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let ceiling = config.model_year_ceiling();
        let tables = match &config.tables.dir {
            Some(dir) => ReferenceTableLoader::from_dir(dir, ceiling)
                .with_context(|| format!("Failed to load tables from: {}", dir.display()))?,
            None => ReferenceTableLoader::builtin(ceiling)
                .context("Failed to load built-in reference tables")?,
        };

        let overlay = if config.feeds.any() {
            let feed = FileIncentiveFeed::new(config.feeds.federal.clone(), config.feeds.state.clone());
            LiveDataOverlay::new(Arc::new(feed), config.feed_timeout())
        } else {
            debug!("no incentive feeds configured");
            LiveDataOverlay::disabled()
        };

        Ok(Self {
            default_tier: config.default_tier()?,
            default_mileage: config.default_mileage()?,
            ..Self::new(tables, overlay)
        })
    }

    pub fn credits(&self) -> CreditResolver<'_> {
        CreditResolver::new(&self.tables, &self.overlay)
    }

    /// Starts overlay population in the background. Lookups keep working on
    /// static data until it finishes.
    pub fn spawn_overlay_population(&self) -> JoinHandle<()> {
        let overlay = Arc::clone(&self.overlay);
        tokio::spawn(async move {
            overlay.populate().await;
            info!(status = ?overlay.status(), "incentive overlay task finished");
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use lease_core::OverlayStatus;

    #[test]
    fn from_default_config_uses_builtin_tables_and_no_feed() {
        let estimator = Estimator::from_config(&AppConfig::default()).unwrap();

        assert!(!estimator.overlay.is_enabled());
        assert!(estimator.tables.fees("BMW").is_some());
        assert_eq!(estimator.default_mileage, MileageAllowance(12000));
    }

    #[test]
    fn from_config_applies_defaults_section() {
        let config =
            AppConfig::from_toml_str("[defaults]\ntier = \"tier3\"\nmileage = \"15,000\"\n").unwrap();

        let estimator = Estimator::from_config(&config).unwrap();

        assert_eq!(estimator.default_tier, CreditTier::Tier3);
        assert_eq!(estimator.default_mileage, MileageAllowance(15000));
    }

    #[test]
    fn missing_table_dir_falls_back_to_embedded_files() {
        let config = AppConfig::from_toml_str("[tables]\ndir = \"/no/such/dir\"\n").unwrap();

        let estimator = Estimator::from_config(&config).unwrap();

        assert_eq!(estimator.tables.states().count(), 52);
    }

    #[tokio::test]
    async fn background_population_completes_with_missing_feed_files() {
        let config =
            AppConfig::from_toml_str("[feeds]\nfederal = \"/no/such/federal.json\"\n").unwrap();
        let estimator = Estimator::from_config(&config).unwrap();

        estimator.spawn_overlay_population().await.unwrap();

        assert_eq!(estimator.overlay.status(), OverlayStatus::Ready);
        assert!(estimator.overlay.federal_credits().is_empty());
    }
}
