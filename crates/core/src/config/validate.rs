use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - orchestrator.max_parallel is not 0
/// - engine.timeout_secs and engine.probe_frames are not 0
/// - the media section selects at least one extension
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.max_parallel == Some(0) {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_parallel cannot be 0".to_string(),
        ));
    }

    if config.engine.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.engine.probe_frames == 0 {
        return Err(ConfigError::ValidationError(
            "engine.probe_frames cannot be 0".to_string(),
        ));
    }

    if config.media.filter().is_empty() {
        return Err(ConfigError::ValidationError(
            "media section selects no extensions".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::engine::EngineConfig;
    use crate::orchestrator::OrchestratorConfig;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_parallelism_fails() {
        let config = Config {
            orchestrator: OrchestratorConfig::default().with_max_parallel(0),
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let config = Config {
            engine: EngineConfig::default().with_timeout(0),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_extensions_fail() {
        let config = Config {
            media: MediaConfig {
                extensions: vec![" ".to_string(), ".".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
