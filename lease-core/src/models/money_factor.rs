use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Credit-risk bucket used by captive lenders. `Tier1` is the best credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CreditTier {
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
}

impl CreditTier {
    pub fn all() -> &'static [CreditTier] {
        &[
            CreditTier::Tier1,
            CreditTier::Tier2,
            CreditTier::Tier3,
            CreditTier::Tier4,
            CreditTier::Tier5,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
            Self::Tier4 => "tier4",
            Self::Tier5 => "tier5",
        }
    }

    /// Accepts `tier1`..`tier5` (any case) or a bare digit `1`..`5`.
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let digit = lowered.strip_prefix("tier").unwrap_or(&lowered);
        match digit {
            "1" => Some(Self::Tier1),
            "2" => Some(Self::Tier2),
            "3" => Some(Self::Tier3),
            "4" => Some(Self::Tier4),
            "5" => Some(Self::Tier5),
            _ => None,
        }
    }
}

impl fmt::Display for CreditTier {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFactorEntry {
    pub make: String,
    pub model_year: i32,
    pub tier: CreditTier,
    pub money_factor: Decimal,
}
