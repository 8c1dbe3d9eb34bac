//! Configuration types for enrichment, fetching and retries.
//!
//! Plain structs with `Default` values and `with_*` builders. Nothing here
//! reads the environment; see `settings` for that.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::security::NON_ARTICLE_HOSTS;

/// Browser identity sent with page fetches.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Length thresholds, in characters of trimmed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthThresholds {
    /// Anything shorter is rejected before any other check.
    pub generic_min: usize,

    /// Final acceptance floor for ordinary sources.
    pub strict_min: usize,

    /// Final acceptance floor for preferred sources.
    pub preferred_min: usize,

    /// A base plot this long needs no enrichment.
    pub adequate_base_plot: usize,

    /// Minimum length of a normalized synopsis.
    pub normalized_min: usize,
}

impl Default for LengthThresholds {
    fn default() -> Self {
        Self {
            generic_min: 100,
            strict_min: 400,
            preferred_min: 300,
            adequate_base_plot: 800,
            normalized_min: 300,
        }
    }
}

/// Configuration for the enrichment orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnricherConfig {
    /// Directory of `*.json` movie records.
    pub movies_dir: PathBuf,

    /// Length thresholds shared by validator, extractor and orchestrator.
    pub thresholds: LengthThresholds,

    /// Result URLs considered per query.
    ///
    /// Default: 10.
    pub max_results_per_query: usize,

    /// Fixed pause after each query phrasing.
    ///
    /// Default: 1s.
    #[serde(with = "duration_millis")]
    pub query_pause: Duration,

    /// Politeness delay between records, drawn uniformly from this range.
    ///
    /// Default: 2s to 4s.
    #[serde(with = "duration_millis")]
    pub record_delay_min: Duration,
    #[serde(with = "duration_millis")]
    pub record_delay_max: Duration,

    /// Paragraph elements scanned by the generic extraction strategy.
    pub paragraph_scan_limit: usize,

    /// A generic paragraph must be longer than this to be kept.
    pub paragraph_min_chars: usize,

    /// Hand accepted candidates to the text normalizer.
    pub normalize: bool,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            movies_dir: PathBuf::from("data/movies"),
            thresholds: LengthThresholds::default(),
            max_results_per_query: 10,
            query_pause: Duration::from_secs(1),
            record_delay_min: Duration::from_secs(2),
            record_delay_max: Duration::from_secs(4),
            paragraph_scan_limit: 15,
            paragraph_min_chars: 50,
            normalize: true,
        }
    }
}

impl EnricherConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the records directory.
    pub fn with_movies_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.movies_dir = dir.into();
        self
    }

    /// Override length thresholds.
    pub fn with_thresholds(mut self, thresholds: LengthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the per-query result cap.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results_per_query = max;
        self
    }

    /// Set the pause between query phrasings.
    pub fn with_query_pause(mut self, pause: Duration) -> Self {
        self.query_pause = pause;
        self
    }

    /// Set the inter-record delay range.
    pub fn with_record_delay(mut self, min: Duration, max: Duration) -> Self {
        self.record_delay_min = min.min(max);
        self.record_delay_max = max.max(min);
        self
    }

    /// Enable or disable normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Configuration for page fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// TCP/TLS connect timeout.
    #[serde(with = "duration_millis")]
    pub connect_timeout: Duration,

    /// Read timeout once connected.
    #[serde(with = "duration_millis")]
    pub read_timeout: Duration,

    /// Browser identity header.
    pub user_agent: String,

    /// Hosts never fetched (host or parent-domain match).
    pub blocked_hosts: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(20),
            user_agent: BROWSER_USER_AGENT.to_string(),
            blocked_hosts: NON_ARTICLE_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl FetchConfig {
    /// Set connect and read timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a denylisted host.
    pub fn with_blocked_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.push(host.into());
        self
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnricherConfig::default();
        assert_eq!(config.thresholds.strict_min, 400);
        assert_eq!(config.thresholds.preferred_min, 300);
        assert_eq!(config.thresholds.adequate_base_plot, 800);
        assert_eq!(config.max_results_per_query, 10);
        assert_eq!(config.paragraph_scan_limit, 15);
        assert!(config.normalize);

        let fetch = FetchConfig::default();
        assert_eq!(fetch.connect_timeout, Duration::from_secs(10));
        assert_eq!(fetch.read_timeout, Duration::from_secs(20));
        assert!(fetch.blocked_hosts.iter().any(|h| h == "snapchat.com"));
    }

    #[test]
    fn test_record_delay_is_ordered() {
        let config = EnricherConfig::new()
            .with_record_delay(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(config.record_delay_min, Duration::from_secs(1));
        assert_eq!(config.record_delay_max, Duration::from_secs(5));
    }

    #[test]
    fn test_config_serializes_durations_as_millis() {
        let json = serde_json::to_value(EnricherConfig::default()).unwrap();
        assert_eq!(json["query_pause"], 1000);
        assert_eq!(json["record_delay_max"], 4000);
    }
}
