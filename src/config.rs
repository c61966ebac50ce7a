use std::env;

/// Engine defaults and tunables. Every value has a documented fallback so
/// the engine behaves identically with no configuration at all; the env
/// overrides exist for reproducing historical statements.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Commission applied when a listing profile has no percentage set.
    pub default_pm_fee_percentage: f64,
    pub flat_tech_fee: f64,
    pub flat_insurance_fee: f64,
    /// Divisor for amortizing per-owner monthly fees onto weekly statements.
    pub weeks_per_month: f64,
    pub default_min_nights_for_proration: i64,
    pub default_expense_category: String,
    pub profile_cache_ttl_seconds: u64,
    pub profile_cache_max_entries: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_pm_fee_percentage: 15.0,
            flat_tech_fee: 50.0,
            flat_insurance_fee: 25.0,
            weeks_per_month: 4.33,
            default_min_nights_for_proration: 28,
            default_expense_category: "General".to_string(),
            profile_cache_ttl_seconds: 300,
            profile_cache_max_entries: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_pm_fee_percentage: env_parse_or(
                "DEFAULT_PM_FEE_PERCENTAGE",
                defaults.default_pm_fee_percentage,
            ),
            flat_tech_fee: env_parse_or("FLAT_TECH_FEE", defaults.flat_tech_fee),
            flat_insurance_fee: env_parse_or("FLAT_INSURANCE_FEE", defaults.flat_insurance_fee),
            weeks_per_month: env_parse_or("WEEKS_PER_MONTH", defaults.weeks_per_month),
            default_min_nights_for_proration: env_parse_or(
                "MIN_NIGHTS_FOR_PRORATION",
                defaults.default_min_nights_for_proration,
            ),
            default_expense_category: env_or(
                "DEFAULT_EXPENSE_CATEGORY",
                &defaults.default_expense_category,
            ),
            profile_cache_ttl_seconds: env_parse_or(
                "PROFILE_CACHE_TTL_SECONDS",
                defaults.profile_cache_ttl_seconds,
            ),
            profile_cache_max_entries: env_parse_or(
                "PROFILE_CACHE_MAX_ENTRIES",
                defaults.profile_cache_max_entries,
            ),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn defaults_match_the_documented_schedule() {
        let config = EngineConfig::default();
        assert_eq!(config.default_pm_fee_percentage, 15.0);
        assert_eq!(config.flat_tech_fee, 50.0);
        assert_eq!(config.flat_insurance_fee, 25.0);
        assert_eq!(config.weeks_per_month, 4.33);
        assert_eq!(config.default_min_nights_for_proration, 28);
        assert_eq!(config.default_expense_category, "General");
    }
}
