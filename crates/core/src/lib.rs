pub mod config;
pub mod discovery;
pub mod engine;
pub mod media;
pub mod orchestrator;
pub mod paths;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, MediaConfig,
};
pub use discovery::{DiscoveryError, MediaFileDiscoverer};
pub use engine::{
    EngineConfig, FfmpegEngine, TranscodeEngine, TranscodeError, TranscodeMode, TranscodeReport,
};
pub use media::{MediaFilter, MediaKind, TargetFormat};
pub use orchestrator::{
    BatchReport, ConversionListener, ConversionOrchestrator, ConversionOutcome,
    ConversionRequest, ConversionTask, ConvertError, NamingPolicy, NoopListener,
    OrchestratorConfig, ProgressSnapshot, TaskError,
};
