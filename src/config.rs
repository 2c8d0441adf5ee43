use std::path::PathBuf;

use crate::constants::{
    API_ERROR_LOG_FILE, DEBUG_LOG_FILE, DEFAULT_IMAGE_MODEL, DEFAULT_LOG_DIR,
    DEFAULT_OPENAI_ENDPOINT,
};
use crate::error::{PhotoEditError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub base_url: String,
    pub model: String,
    pub log_dir: PathBuf,
    pub debug_log_file: String,
    pub error_log_file: String,
    /// Turn acquisition failures into failure items instead of stopping the run.
    pub continue_on_fail: bool,
    pub max_concurrent_requests: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_ENDPOINT.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            debug_log_file: DEBUG_LOG_FILE.to_string(),
            error_log_file: API_ERROR_LOG_FILE.to_string(),
            continue_on_fail: true,
            max_concurrent_requests: 1,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base_url) = value("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = value("PHOTO_EDIT_MODEL") {
            config.model = model;
        }
        if let Some(log_dir) = value("PHOTO_EDIT_LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }
        if let Some(concurrency) = value("PHOTO_EDIT_CONCURRENCY") {
            let parsed = concurrency.parse::<usize>().map_err(|_| {
                PhotoEditError::configuration(format!(
                    "PHOTO_EDIT_CONCURRENCY must be a positive integer, got '{concurrency}'"
                ))
            })?;
            config = config.with_concurrency(parsed);
        }
        if let Some(stop) = value("PHOTO_EDIT_STOP_ON_FAIL") {
            config.continue_on_fail = !parse_flag(&stop).ok_or_else(|| {
                PhotoEditError::configuration(format!(
                    "PHOTO_EDIT_STOP_ON_FAIL must be true or false, got '{stop}'"
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.log_dir, PathBuf::from("/tmp"));
        assert!(config.continue_on_fail);
        assert_eq!(config.max_concurrent_requests, 1);
    }

    #[test]
    fn overrides_are_applied_and_zero_concurrency_is_clamped() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("PHOTO_EDIT_LOG_DIR", "/var/log/photo-edit"),
            ("PHOTO_EDIT_CONCURRENCY", "0"),
            ("PHOTO_EDIT_STOP_ON_FAIL", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/photo-edit"));
        assert_eq!(config.max_concurrent_requests, 1);
        assert!(!config.continue_on_fail);
    }

    #[test]
    fn bad_numbers_are_configuration_errors() {
        let err = NodeConfig::from_lookup(lookup(&[("PHOTO_EDIT_CONCURRENCY", "many")])).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }
}
