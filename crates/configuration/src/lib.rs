use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AllocationLeg, CandidateConfig, Config, DualMomentumConfig, EvaluationSchedule,
    InstrumentConfig, LaaConfig, LegConfig, ProviderConfig, RunConfig, ThresholdMode,
};

/// Loads and validates the application configuration.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, and rejects invalid parameterizations before anything else runs.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path.display(), "loading configuration");

    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::*;
    use std::path::PathBuf;

    fn instrument(symbol: &str) -> InstrumentConfig {
        InstrumentConfig {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
        }
    }

    fn single_leg_candidate(symbol: &str) -> CandidateConfig {
        CandidateConfig {
            name: symbol.to_string(),
            legs: vec![LegConfig {
                symbol: symbol.to_string(),
                weight: 1.0,
            }],
        }
    }

    fn valid_config() -> Config {
        Config {
            run: RunConfig {
                start_year: 2020,
                end_year: 2024,
                warmup_years: 2,
                output_dir: PathBuf::from("out"),
            },
            provider: ProviderConfig {
                max_retries: 3,
                retry_delay_secs: 2,
            },
            dual_momentum: DualMomentumConfig {
                return_window_months: 12,
                threshold_mode: ThresholdMode::Bond,
                bond: instrument("AGG"),
                candidates: vec![
                    single_leg_candidate("SPY"),
                    single_leg_candidate("EFA"),
                    single_leg_candidate("EEM"),
                ],
            },
            laa: LaaConfig {
                market: instrument("^GSPC"),
                sma_window_days: 200,
                macro_series: "UNRATE".to_string(),
                macro_sma_months: 12,
                fred_lag_months: 1,
                schedule: EvaluationSchedule::MonthEnd,
                risk: instrument("QQQ"),
                defensive: instrument("SHY"),
                fixed_legs: vec![
                    AllocationLeg {
                        name: "Value".to_string(),
                        symbol: "IWD".to_string(),
                        weight: 0.25,
                    },
                    AllocationLeg {
                        name: "Gold".to_string(),
                        symbol: "GLD".to_string(),
                        weight: 0.25,
                    },
                    AllocationLeg {
                        name: "Treasuries".to_string(),
                        symbol: "IEF".to_string(),
                        weight: 0.25,
                    },
                ],
                timing_weight: 0.25,
            },
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn zero_return_window_is_rejected() {
        let mut config = valid_config();
        config.dual_momentum.return_window_months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sma_window_is_rejected() {
        let mut config = valid_config();
        config.laa.sma_window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let mut config = valid_config();
        config.dual_momentum.candidates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn composite_weights_must_sum_to_one() {
        let mut config = valid_config();
        config.dual_momentum.candidates[0] = CandidateConfig {
            name: "Developed".to_string(),
            legs: vec![
                LegConfig {
                    symbol: "A".to_string(),
                    weight: 0.5,
                },
                LegConfig {
                    symbol: "B".to_string(),
                    weight: 0.4,
                },
            ],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn allocation_weights_must_sum_to_one() {
        let mut config = valid_config();
        config.laa.timing_weight = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let mut config = valid_config();
        config.run.start_year = 2025;
        config.run.end_year = 2020;
        assert!(config.validate().is_err());
    }

    #[test]
    fn composite_candidate_display_symbol_joins_legs() {
        let candidate = CandidateConfig {
            name: "Developed".to_string(),
            legs: vec![
                LegConfig {
                    symbol: "195930.KS".to_string(),
                    weight: 0.5,
                },
                LegConfig {
                    symbol: "241180.KS".to_string(),
                    weight: 0.5,
                },
            ],
        };
        assert_eq!(candidate.display_symbol(), "195930.KS+241180.KS");
    }
}
