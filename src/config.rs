use crate::error::{KpiError, Result};
use crate::period::Period;
use crate::trend::DEFAULT_TREND_MONTHS;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "WASTE_KPI_DATA_DIR";
pub const ENV_OUTPUT_DIR: &str = "WASTE_KPI_OUTPUT_DIR";
pub const ENV_PERIOD: &str = "WASTE_KPI_PERIOD";
pub const ENV_TREND_MONTHS: &str = "WASTE_KPI_TREND_MONTHS";
pub const ENV_LOG: &str = "WASTE_KPI_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Target period; `None` means "latest period in the data".
    pub period: Option<Period>,
    pub trend_months: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            period: None,
            trend_months: DEFAULT_TREND_MONTHS,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment, after loading an
    /// optional `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let trend_months = match get(ENV_TREND_MONTHS) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(KpiError::Config(format!(
                        "{ENV_TREND_MONTHS} must be a positive integer, got `{raw}`"
                    )))
                }
            },
            None => defaults.trend_months,
        };

        Ok(Config {
            data_dir: get(ENV_DATA_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            output_dir: get(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            period: get(ENV_PERIOD).map(Period::parse).transpose()?,
            trend_months,
            log_filter: get(ENV_LOG).map(str::to_string).unwrap_or(defaults.log_filter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(Config::from_vars(&HashMap::new()).unwrap(), Config::default());
    }

    #[test]
    fn values_are_read() {
        let cfg = Config::from_vars(&vars(&[
            (ENV_DATA_DIR, "/srv/waste"),
            (ENV_PERIOD, "2024-04"),
            (ENV_TREND_MONTHS, "12"),
            (ENV_LOG, "debug"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/waste"));
        assert_eq!(cfg.period.unwrap().as_str(), "2024-04");
        assert_eq!(cfg.trend_months, 12);
        assert_eq!(cfg.log_filter, "debug");
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(matches!(
            Config::from_vars(&vars(&[(ENV_TREND_MONTHS, "0")])),
            Err(KpiError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(&vars(&[(ENV_TREND_MONTHS, "six")])),
            Err(KpiError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(&vars(&[(ENV_PERIOD, "April")])),
            Err(KpiError::InvalidPeriod(_))
        ));
    }
}
