mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AnalysisSettings, DatabaseSettings, InferenceSettings, LoggingSettings, ModelSettings,
    RetrySettings, Settings, SettingsError, StorageSettings, VisionSettings,
};
