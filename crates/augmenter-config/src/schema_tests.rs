
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.observer.poll_interval_ms, 500);
        assert_eq!(config.observer.startup_delay_ms, 1000);
        assert_eq!(config.observer.refresh_timeout_ms, 2000);
        assert_eq!(config.presentation.poll_interval_ms, 2000);
        assert_eq!(config.presentation.refresh_settle_ms, 500);
        assert_eq!(config.service.top_k, 5);
        assert_eq!(config.refresh.port, 8791);
    }

    #[test]
    fn test_default_attribute_filter() {
        let config = ObserverConfig::default();
        assert_eq!(
            config.mutation_attribute_filter,
            vec!["contenteditable".to_string(), "placeholder".to_string()]
        );
    }

    #[test]
    fn test_default_host_patterns() {
        let config = ObserverConfig::default();
        assert_eq!(config.host_patterns, vec!["chatgpt.com", "chat.openai.com"]);
    }

    #[test]
    fn test_default_selectors_specific_first() {
        let selectors = default_selectors();
        assert_eq!(selectors.first().map(String::as_str), Some("#prompt-textarea"));
        assert_eq!(selectors.last().map(String::as_str), Some("textarea"));
        let generic_rich = selectors
            .iter()
            .position(|s| s == r#"div[contenteditable="true"]"#)
            .unwrap();
        let testid_rich = selectors
            .iter()
            .position(|s| s.contains("data-testid"))
            .unwrap();
        assert!(testid_rich < generic_rich);
    }

    #[test]
    fn test_store_resolved_path_expands_tilde() {
        let store = StoreConfig::default();
        let resolved = store.resolved_path();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with(".augmenter/state.json"));
    }

    #[test]
    fn test_store_resolved_path_absolute() {
        let store = StoreConfig {
            path: "/var/tmp/augmenter.json".to_string(),
        };
        assert_eq!(store.resolved_path(), PathBuf::from("/var/tmp/augmenter.json"));
    }

    #[test]
    fn test_refresh_addresses() {
        let refresh = RefreshConfig::default();
        assert_eq!(refresh.bind_addr(), "127.0.0.1:8791");
        assert_eq!(refresh.base_url(), "http://127.0.0.1:8791");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.observer.locator.selectors, config.observer.locator.selectors);
        assert_eq!(parsed.service.base_url, config.service.base_url);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let parsed: Config = toml::from_str("[service]\ntop_k = 10\n").unwrap();
        assert_eq!(parsed.service.top_k, 10);
        assert_eq!(parsed.service.base_url, "http://localhost:5001");
        assert_eq!(parsed.service.timeout_seconds, 30);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = crate::ConfigLoader::load_str(include_str!("../../../config/default.toml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.observer.locator.selectors, defaults.observer.locator.selectors);
        assert_eq!(config.observer.poll_interval_ms, defaults.observer.poll_interval_ms);
        assert_eq!(config.observer.host_patterns, defaults.observer.host_patterns);
        assert_eq!(config.presentation.poll_interval_ms, 2000);
        assert_eq!(config.refresh.port, 8791);
        assert_eq!(config.store.path, "~/.augmenter/state.json");
    }
