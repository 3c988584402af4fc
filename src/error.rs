use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown electrical role '{role}' on pin {pin}")]
    UnknownRole { pin: String, role: String },

    #[error("Duplicate member P{port}{index}: pin {pin} collides with pin {existing}")]
    DuplicatePortMember {
        port: char,
        index: u32,
        pin: String,
        existing: String,
    },

    #[error("Pin name {pin} is ambiguous between {candidates:?}")]
    AmbiguousPinName {
        pin: String,
        candidates: Vec<String>,
    },

    #[error("No footprint mapped for device {device}, package {package}")]
    MissingFootprint { device: String, package: String },

    #[error("No package mapped for device {device}")]
    UnknownPackage { device: String },

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Layout task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
