// src/config/mod.rs
pub mod settings;
pub mod sources;

pub use settings::ServiceSettings;
pub use sources::SourcesConfig;
