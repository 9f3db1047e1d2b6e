mod hf_whisper_engine;

pub use hf_whisper_engine::HfWhisperEngine;
