//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_observer(config, &mut result);
        Self::validate_store(config, &mut result);
        Self::validate_presentation(config, &mut result);
        Self::validate_service(config, &mut result);
        Self::validate_refresh(config, &mut result);

        Ok(result)
    }

    fn validate_observer(config: &Config, result: &mut ValidationResult) {
        let observer = &config.observer;

        if observer.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "observer.poll_interval_ms",
                "Poll interval must be greater than 0",
            ));
        } else if observer.poll_interval_ms > 10_000 {
            result.add_warning(ValidationWarning::new(
                "observer.poll_interval_ms",
                "Poll interval above 10s makes change detection sluggish",
            ));
        }

        if observer.refresh_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "observer.refresh_timeout_ms",
                "Refresh timeout must be greater than 0",
            ));
        }

        if observer.startup_delay_ms > 30_000 {
            result.add_warning(ValidationWarning::new(
                "observer.startup_delay_ms",
                "Startup delay above 30s",
            ));
        }

        if observer.locator.selectors.is_empty() {
            result.add_error(ValidationError::new(
                "observer.locator.selectors",
                "At least one locator selector is required",
            ));
        }

        for (i, selector) in observer.locator.selectors.iter().enumerate() {
            if selector.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("observer.locator.selectors[{}]", i),
                    "Selector cannot be empty",
                ));
            }
        }

        for (i, pattern) in observer.host_patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("observer.host_patterns[{}]", i),
                    "Host pattern cannot be empty",
                ));
            }
        }
    }

    fn validate_store(config: &Config, result: &mut ValidationResult) {
        if config.store.path.trim().is_empty() {
            result.add_error(ValidationError::new("store.path", "Store path cannot be empty"));
        }
    }

    fn validate_presentation(config: &Config, result: &mut ValidationResult) {
        let presentation = &config.presentation;

        if presentation.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "presentation.poll_interval_ms",
                "Poll interval must be greater than 0",
            ));
        }

        if presentation.refresh_settle_ms > 10_000 {
            result.add_warning(ValidationWarning::new(
                "presentation.refresh_settle_ms",
                "Refresh settle delay above 10s",
            ));
        }
    }

    fn validate_service(config: &Config, result: &mut ValidationResult) {
        let service = &config.service;

        if !service.base_url.starts_with("http://") && !service.base_url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "service.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if service.top_k == 0 {
            result.add_error(ValidationError::new("service.top_k", "top_k must be greater than 0"));
        } else if service.top_k > 100 {
            result.add_warning(ValidationWarning::new(
                "service.top_k",
                "Very high top_k may produce slow searches",
            ));
        }

        if service.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "service.timeout_seconds",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_refresh(config: &Config, result: &mut ValidationResult) {
        if config.refresh.port == 0 {
            result.add_error(ValidationError::new("refresh.port", "Port cannot be 0"));
        }

        if config.refresh.host.trim().is_empty() {
            result.add_error(ValidationError::new("refresh.host", "Host cannot be empty"));
        }
    }
}
