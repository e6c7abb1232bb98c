
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_zero_observer_poll() {
        let mut config = Config::default();
        config.observer.poll_interval_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "observer.poll_interval_ms"));
    }

    #[test]
    fn test_validate_slow_observer_poll_warning() {
        let mut config = Config::default();
        config.observer.poll_interval_ms = 60_000;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_selectors() {
        let mut config = Config::default();
        config.observer.locator.selectors.clear();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "observer.locator.selectors"));
    }

    #[test]
    fn test_validate_blank_selector() {
        let mut config = Config::default();
        config.observer.locator.selectors.push("  ".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path.starts_with("observer.locator.selectors[")));
    }

    #[test]
    fn test_validate_blank_host_pattern() {
        let mut config = Config::default();
        config.observer.host_patterns = vec!["chatgpt.com".to_string(), "".to_string()];

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "observer.host_patterns[1]"));
    }

    #[test]
    fn test_validate_no_host_patterns_is_valid() {
        let mut config = Config::default();
        config.observer.host_patterns.clear();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_zero_refresh_timeout() {
        let mut config = Config::default();
        config.observer.refresh_timeout_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_zero_presentation_poll() {
        let mut config = Config::default();
        config.presentation.poll_interval_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "presentation.poll_interval_ms"));
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = Config::default();
        config.service.base_url = "localhost:5001".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "service.base_url"));
    }

    #[test]
    fn test_validate_high_top_k_warning() {
        let mut config = Config::default();
        config.service.top_k = 500;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "service.top_k"));
    }

    #[test]
    fn test_validate_invalid_refresh_port() {
        let mut config = Config::default();
        config.refresh.port = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "refresh.port"));
    }

    #[test]
    fn test_into_result_reports_first_error() {
        let mut config = Config::default();
        config.store.path = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        let err = result.into_result().unwrap_err();
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn test_into_result_passes_warnings() {
        let mut config = Config::default();
        config.presentation.refresh_settle_ms = 20_000;

        let result = ConfigValidator::validate(&config).unwrap();
        let warnings = result.into_result().unwrap();
        assert_eq!(warnings.len(), 1);
    }
