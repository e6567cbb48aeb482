use std::time::Duration;

use crate::error::{InlinerError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.inliner.ai";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://img.inliner.ai";

/// Seconds between polling attempts.
pub const POLL_INTERVAL_SECS: u64 = 3;

/// Default polling budget for generate/edit jobs.
pub const DEFAULT_MAX_POLL_SECS: u64 = 180;

fn normalize(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

/// What happens when the smart URL recommendation call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendationPolicy {
    /// Fall back to the locally computed slug.
    #[default]
    BestEffort,
    /// Surface the failure to the caller.
    Required,
}

/// Immutable client configuration, fixed at construction.
///
/// Use [`InlinerConfig::builder()`] to override defaults, or
/// [`InlinerConfig::from_env()`] to read `INLINER_API_KEY`,
/// `INLINER_API_URL`, and `INLINER_IMAGE_URL`.
#[derive(Debug, Clone)]
pub struct InlinerConfig {
    /// Bearer token sent with every API request.
    pub api_key: String,

    /// REST API root, without trailing slash.
    pub api_base_url: String,

    /// CDN root images are served from, without trailing slash.
    pub image_base_url: String,

    /// Socket timeout for a single HTTP call (default: 60s).
    pub request_timeout: Duration,

    /// Delay between polling attempts (default: 3s).
    pub poll_interval: Duration,

    /// Polling budget used when the caller does not pass one (default: 180s).
    pub max_poll_seconds: u64,

    /// Behavior when smart URL recommendation fails.
    pub recommendation_policy: RecommendationPolicy,
}

impl InlinerConfig {
    /// Config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_poll_seconds: DEFAULT_MAX_POLL_SECS,
            recommendation_policy: RecommendationPolicy::BestEffort,
        }
    }

    /// Start building a config with the builder pattern.
    pub fn builder(api_key: impl Into<String>) -> InlinerConfigBuilder {
        InlinerConfigBuilder {
            config: Self::new(api_key),
        }
    }

    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("INLINER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InlinerError::Validation("INLINER_API_KEY is not set".into()))?;

        let mut builder = Self::builder(api_key);
        if let Some(url) = lookup("INLINER_API_URL") {
            builder = builder.with_api_base_url(url);
        }
        if let Some(url) = lookup("INLINER_IMAGE_URL") {
            builder = builder.with_image_base_url(url);
        }
        builder.build()
    }

    /// `floor(max_seconds / interval)`, the number of polling attempts for a budget.
    ///
    /// Computed in milliseconds so fractional intervals keep the total wait
    /// within the budget.
    pub fn max_attempts(&self, max_seconds: u64) -> u64 {
        let interval_ms = self.poll_interval.as_millis().max(1);
        let attempts = u128::from(max_seconds) * 1000 / interval_ms;
        u64::try_from(attempts).unwrap_or(u64::MAX)
    }

    /// Public CDN URL for a content path.
    pub fn image_url(&self, content_path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url,
            content_path.trim_start_matches('/')
        )
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`InlinerConfig`].
#[derive(Debug, Clone)]
pub struct InlinerConfigBuilder {
    config: InlinerConfig,
}

impl InlinerConfigBuilder {
    /// Point the client at a different REST API root.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Point the client at a different CDN root.
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_base_url = url.into();
        self
    }

    /// Set the per-call HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the delay between polling attempts.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the default polling budget in seconds.
    pub fn with_max_poll_seconds(mut self, seconds: u64) -> Self {
        self.config.max_poll_seconds = seconds;
        self
    }

    /// Choose whether recommendation failures are swallowed or surfaced.
    pub fn with_recommendation_policy(mut self, policy: RecommendationPolicy) -> Self {
        self.config.recommendation_policy = policy;
        self
    }

    /// Build the final [`InlinerConfig`]. A zero poll interval is rejected.
    pub fn build(self) -> Result<InlinerConfig> {
        let mut config = self.config;
        if config.poll_interval.is_zero() {
            return Err(InlinerError::Validation(
                "Poll interval must be greater than zero".into(),
            ));
        }
        config.api_base_url = normalize(config.api_base_url);
        config.image_base_url = normalize(config.image_base_url);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = InlinerConfig::new("key");
        assert_eq!(config.api_base_url, "https://api.inliner.ai");
        assert_eq!(config.image_base_url, "https://img.inliner.ai");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.max_poll_seconds, 180);
        assert_eq!(config.recommendation_policy, RecommendationPolicy::BestEffort);
    }

    #[test]
    fn test_builder_normalizes_urls() {
        let config = InlinerConfig::builder("key")
            .with_api_base_url("http://localhost:8080///")
            .with_image_base_url("http://cdn.local/")
            .build()
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.image_base_url, "http://cdn.local");
        assert_eq!(config.api_url("/content/generate"), "http://localhost:8080/content/generate");
    }

    #[test]
    fn test_max_attempts_floors() {
        let config = InlinerConfig::new("key");
        assert_eq!(config.max_attempts(9), 3);
        assert_eq!(config.max_attempts(10), 3);
        assert_eq!(config.max_attempts(180), 60);
        assert_eq!(config.max_attempts(2), 0);
    }

    #[test]
    fn test_max_attempts_with_sub_second_interval() {
        let config = InlinerConfig::builder("key")
            .with_poll_interval(Duration::from_millis(500))
            .build()
            .unwrap();
        assert_eq!(config.max_attempts(9), 18);
        assert_eq!(config.max_attempts(0), 0);
    }

    #[test]
    fn test_max_attempts_with_fractional_interval() {
        let config = InlinerConfig::builder("key")
            .with_poll_interval(Duration::from_millis(3500))
            .build()
            .unwrap();
        // 51 attempts sleep 50 * 3.5s = 175s, inside the 180s budget
        assert_eq!(config.max_attempts(180), 51);
        let waited = config.poll_interval * (config.max_attempts(180) as u32 - 1);
        assert!(waited <= Duration::from_secs(180));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let err = InlinerConfig::builder("key")
            .with_poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, InlinerError::Validation(_)));
    }

    #[test]
    fn test_image_url() {
        let config = InlinerConfig::new("key");
        assert_eq!(
            config.image_url("/web/neon-lizard.png"),
            "https://img.inliner.ai/web/neon-lizard.png"
        );
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("INLINER_API_KEY", "secret"),
            ("INLINER_IMAGE_URL", "http://cdn.test/"),
        ]
        .into_iter()
        .collect();
        let config =
            InlinerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.image_base_url, "http://cdn.test");
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let err = InlinerConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, InlinerError::Validation(_)));
    }
}
