//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist. Parse errors are still reported.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "env".to_string(),
            message: e.to_string(),
        })?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.augmenter`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.observer.poll_interval_ms, 500);
        assert_eq!(config.presentation.poll_interval_ms, 2000);
    }

    #[test]
    fn test_load_observer_section() {
        let content = r#"
            [observer]
            poll_interval_ms = 250
            startup_delay_ms = 0
            mutation_attribute_filter = ["contenteditable"]
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.observer.poll_interval_ms, 250);
        assert_eq!(config.observer.startup_delay_ms, 0);
        assert_eq!(config.observer.mutation_attribute_filter, vec!["contenteditable"]);
    }

    #[test]
    fn test_load_locator_selectors() {
        let content = r##"
            [observer.locator]
            selectors = ["#composer", "textarea"]
        "##;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.observer.locator.selectors, vec!["#composer", "textarea"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[service]").unwrap();
        writeln!(file, "base_url = \"http://localhost:9000\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.service.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_nonexistent_file() {
        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.refresh.port, 8791);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("AUGMENTER_TEST_SEARCH_URL", "http://search.local");
        }
        let content = "[service]\nbase_url = \"${AUGMENTER_TEST_SEARCH_URL}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.service.base_url, "http://search.local");
        unsafe {
            std::env::remove_var("AUGMENTER_TEST_SEARCH_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_AUGMENTER_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/state.json");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/state.json"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/tmp/state.json"), "/tmp/state.json");
    }
}
