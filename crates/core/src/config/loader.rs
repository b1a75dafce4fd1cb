use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `OPSIFY_ENGINE__TIMEOUT_SECS=60`.
const ENV_PREFIX: &str = "OPSIFY_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load defaults with environment variable overrides (no config file)
pub fn load_config_or_default() -> Result<Config, ConfigError> {
    extract(Figment::from(Serialized::defaults(Config::default())))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    // Double underscore separates sections so field names keep their underscores
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use crate::orchestrator::NamingPolicy;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[engine]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 120

[orchestrator]
max_parallel = 3
naming = "exclusive"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.engine.timeout_secs, 120);
        assert_eq!(config.engine.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.orchestrator.max_parallel, Some(3));
        assert_eq!(config.orchestrator.naming, NamingPolicy::Exclusive);
    }

    #[test]
    fn test_load_config_from_str_empty_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_str_bad_naming() {
        let toml = r#"
[orchestrator]
naming = "sometimes"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/opsify.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[media]
kind = "video"
extra_extensions = ["ts"]

[engine]
audio_bitrate_kbps = 256
extra_ffmpeg_args = ["-map_metadata", "0"]
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.media.kind, MediaKind::Video);
        assert_eq!(config.media.extra_extensions, vec!["ts".to_string()]);
        assert_eq!(config.engine.audio_bitrate_kbps, 256);
        assert_eq!(config.engine.extra_ffmpeg_args.len(), 2);
        assert!(config.media.filter().matches(Path::new("clip.ts")));
    }
}
