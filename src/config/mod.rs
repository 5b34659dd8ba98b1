//! Configuration handling for an analysis run.
//!
//! Every entry point of the analysis core receives an explicit, validated
//! [`AnalysisConfig`]; nothing in `analysis` reads the environment. The
//! binary builds the config with `from_env` (development defaults when the
//! variables are absent) and then applies CLI overrides before calling
//! `validate`.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::analysis::url::UrlMode;

/// Environment variable names. Public so tests and the binary can refer to them.
pub const ENV_MIN_POSITION: &str = "STRIKING_MIN_POSITION";
pub const ENV_MAX_POSITION: &str = "STRIKING_MAX_POSITION";
pub const ENV_TOP_N: &str = "STRIKING_TOP_N";
pub const ENV_MIN_CLICKS: &str = "STRIKING_MIN_CLICKS";
pub const ENV_BRANDED_TERMS: &str = "STRIKING_BRANDED_TERMS";
pub const ENV_URL_EXCLUSIONS: &str = "STRIKING_URL_EXCLUSIONS";
pub const ENV_PROTOCOL_AGNOSTIC: &str = "STRIKING_PROTOCOL_AGNOSTIC";
pub const ENV_FETCH_CONCURRENCY: &str = "STRIKING_FETCH_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "STRIKING_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "STRIKING_USER_AGENT";

const DEFAULT_MIN_POSITION: u32 = 4;
const DEFAULT_MAX_POSITION: u32 = 20;
const DEFAULT_TOP_N: usize = 10;
const DEFAULT_MIN_CLICKS: u64 = 1;
const DEFAULT_FETCH_CONCURRENCY: usize = 4;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str =
    "StrikingDistanceBot/0.1 (+https://github.com/striking-distance/striking-distance)";

pub const TOP_N_RANGE: (usize, usize) = (1, 20);
pub const FETCH_CONCURRENCY_RANGE: (usize, usize) = (1, 32);
pub const FETCH_TIMEOUT_RANGE: (u64, u64) = (10, 120);

/// Inclusive ranking-position window for "striking distance" queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionBand {
    pub min: u32,
    pub max: u32,
}

impl PositionBand {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.min as f64 && position <= self.max as f64
    }

    /// Position assigned to rows when the input carries no usable ranking data.
    pub fn neutral_position(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }
}

impl Default for PositionBand {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_POSITION, DEFAULT_MAX_POSITION)
    }
}

/// Settings consumed by the processor and the report builder.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    position_band: PositionBand,
    top_n: usize,
    minimum_clicks: u64,
    branded_terms: Vec<String>,
    url_exclusions: Vec<String>,
    url_mode: UrlMode,
}

impl AnalysisConfig {
    /// Load from environment variables, falling back to the defaults.
    ///
    /// Unparseable numbers are reported as `ConfigError::InvalidValue`; range
    /// checks happen in [`AnalysisConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(min) = parse_env::<u32>(ENV_MIN_POSITION)? {
            config.position_band.min = min;
        }
        if let Some(max) = parse_env::<u32>(ENV_MAX_POSITION)? {
            config.position_band.max = max;
        }
        if let Some(top_n) = parse_env::<usize>(ENV_TOP_N)? {
            config.top_n = top_n;
        }
        if let Some(min_clicks) = parse_env::<u64>(ENV_MIN_CLICKS)? {
            config.minimum_clicks = min_clicks;
        }
        if let Ok(raw) = env::var(ENV_BRANDED_TERMS) {
            config.branded_terms = split_list(&raw);
        }
        if let Ok(raw) = env::var(ENV_URL_EXCLUSIONS) {
            config.url_exclusions = split_list(&raw);
        }
        if let Some(agnostic) = parse_env::<bool>(ENV_PROTOCOL_AGNOSTIC)? {
            config.url_mode = UrlMode::from_agnostic_flag(agnostic);
        }
        Ok(config)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let band = self.position_band;
        if band.min > band.max {
            return Err(ConfigError::InvalidValue {
                field: "position_band",
                reason: format!("min ({}) is greater than max ({})", band.min, band.max),
            });
        }
        let (lo, hi) = TOP_N_RANGE;
        if !(lo..=hi).contains(&self.top_n) {
            return Err(ConfigError::InvalidValue {
                field: "top_n",
                reason: format!("{} is outside {lo}..={hi}", self.top_n),
            });
        }
        Ok(self)
    }

    pub fn with_position_band(mut self, band: PositionBand) -> Self {
        self.position_band = band;
        self
    }
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
    pub fn with_minimum_clicks(mut self, minimum_clicks: u64) -> Self {
        self.minimum_clicks = minimum_clicks;
        self
    }
    pub fn with_branded_terms(mut self, terms: Vec<String>) -> Self {
        self.branded_terms = terms;
        self
    }
    pub fn with_url_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.url_exclusions = exclusions;
        self
    }
    pub fn with_url_mode(mut self, mode: UrlMode) -> Self {
        self.url_mode = mode;
        self
    }

    /// Ranking window; rows outside it are dropped when positions are known.
    pub fn position_band(&self) -> PositionBand {
        self.position_band
    }
    /// Number of queries kept per URL.
    pub fn top_n(&self) -> usize {
        self.top_n
    }
    pub fn minimum_clicks(&self) -> u64 {
        self.minimum_clicks
    }
    pub fn branded_terms(&self) -> &[String] {
        &self.branded_terms
    }
    pub fn url_exclusions(&self) -> &[String] {
        &self.url_exclusions
    }
    pub fn url_mode(&self) -> UrlMode {
        self.url_mode
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            position_band: PositionBand::default(),
            top_n: DEFAULT_TOP_N,
            minimum_clicks: DEFAULT_MIN_CLICKS,
            branded_terms: Vec::new(),
            url_exclusions: Vec::new(),
            url_mode: UrlMode::default(),
        }
    }
}

/// Settings for the live content collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(concurrency) = parse_env::<usize>(ENV_FETCH_CONCURRENCY)? {
            config.concurrency = concurrency;
        }
        if let Some(secs) = parse_env::<u64>(ENV_FETCH_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(agent) = env::var(ENV_USER_AGENT)
            && !agent.trim().is_empty()
        {
            config.user_agent = agent.trim().to_string();
        }
        Ok(config)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let (lo, hi) = FETCH_CONCURRENCY_RANGE;
        if !(lo..=hi).contains(&self.concurrency) {
            return Err(ConfigError::InvalidValue {
                field: "fetch_concurrency",
                reason: format!("{} is outside {lo}..={hi}", self.concurrency),
            });
        }
        let (lo, hi) = FETCH_TIMEOUT_RANGE;
        let secs = self.timeout.as_secs();
        if !(lo..=hi).contains(&secs) {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_secs",
                reason: format!("{secs} is outside {lo}..={hi}"),
            });
        }
        Ok(self)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Splits a newline- or comma-separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: key,
                reason: format!("cannot parse {raw:?}"),
            }),
        _ => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_MIN_POSITION,
            ENV_MAX_POSITION,
            ENV_TOP_N,
            ENV_MIN_CLICKS,
            ENV_BRANDED_TERMS,
            ENV_URL_EXCLUSIONS,
            ENV_PROTOCOL_AGNOSTIC,
            ENV_FETCH_CONCURRENCY,
            ENV_FETCH_TIMEOUT_SECS,
            ENV_USER_AGENT,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = AnalysisConfig::from_env().unwrap().validate().unwrap();
        assert_eq!(cfg.position_band(), PositionBand::new(4, 20));
        assert_eq!(cfg.top_n(), 10);
        assert_eq!(cfg.minimum_clicks(), 1);
        assert!(cfg.branded_terms().is_empty());
        assert_eq!(cfg.url_mode(), UrlMode::ProtocolAware);

        let fetch = FetchConfig::from_env().unwrap().validate().unwrap();
        assert_eq!(fetch.concurrency, 4);
        assert_eq!(fetch.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_MIN_POSITION, "2");
            env::set_var(ENV_MAX_POSITION, "15");
            env::set_var(ENV_TOP_N, "5");
            env::set_var(ENV_BRANDED_TERMS, "acme\nAcme Corp, ");
            env::set_var(ENV_PROTOCOL_AGNOSTIC, "true");
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "60");
        }
        let cfg = AnalysisConfig::from_env().unwrap();
        assert_eq!(cfg.position_band(), PositionBand::new(2, 15));
        assert_eq!(cfg.top_n(), 5);
        assert_eq!(cfg.branded_terms(), ["acme", "Acme Corp"]);
        assert_eq!(cfg.url_mode(), UrlMode::ProtocolAgnostic);
        let fetch = FetchConfig::from_env().unwrap();
        assert_eq!(fetch.timeout, Duration::from_secs(60));
        clear_env();
    }

    #[test]
    fn unparseable_env_value_is_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_TOP_N, "ten");
        }
        let err = AnalysisConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_TOP_N));
        clear_env();
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(AnalysisConfig::default().with_top_n(0).validate().is_err());
        assert!(AnalysisConfig::default().with_top_n(21).validate().is_err());
        assert!(
            AnalysisConfig::default()
                .with_position_band(PositionBand::new(10, 5))
                .validate()
                .is_err()
        );
        let fetch = FetchConfig {
            timeout: Duration::from_secs(5),
            ..FetchConfig::default()
        };
        assert!(fetch.validate().is_err());
    }

    #[test]
    fn neutral_position_is_band_midpoint() {
        assert_eq!(PositionBand::default().neutral_position(), 12.0);
        assert!(PositionBand::default().contains(4.0));
        assert!(PositionBand::default().contains(20.0));
        assert!(!PositionBand::default().contains(20.5));
    }
}
