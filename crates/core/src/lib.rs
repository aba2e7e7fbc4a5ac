pub mod batch;
pub mod config;
pub mod media;
pub mod metrics;
pub mod output;
pub mod progress;
pub mod queue;
pub mod testing;
pub mod transcoder;

pub use batch::{
    BatchError, BatchOrchestrator, BatchRequest, ConversionOutcome, ItemReport,
    OrchestratorConfig, RunHandle, RunOutcome, RunSummary,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, LogFormat, LoggingConfig, OutputConfig,
};
pub use media::{ConversionItem, MediaCategory, TargetFormat};
pub use output::OutputPolicy;
pub use progress::{BatchEvent, RunProgress};
pub use queue::JobQueue;
pub use transcoder::{
    FfmpegConfig, FfmpegTranscoder, ImageConfig, ImageTranscoder, MediaTranscoder,
    TranscodeError, Transcoder,
};
