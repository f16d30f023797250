use thiserror::Error;

#[derive(Error, Debug)]
pub enum PelotonError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Stage profile weights must sum to 1.0, got {total}")]
    InvalidStageProfile { total: f64 },

    #[error("Unknown rider: '{0}'")]
    UnknownRider(String),

    #[error("Invalid team selection: {0}")]
    InvalidTeam(String),

    #[error("Unknown stage number: {0}")]
    UnknownStage(usize),
}

pub type PtResult<T> = Result<T, PelotonError>;
