use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("Invalid species '{0}': not present in the species registry")]
    InvalidSpecies(String),

    #[error("Machine '{0}' is not currently available")]
    UnsupportedMachine(String),

    #[error("Unsupported plasma simulation format: {0}")]
    UnsupportedSimulationFormat(String),

    #[error("Plasma composition has no {species} ionisation stage {ionisation}")]
    MissingComposition { species: String, ionisation: u32 },

    #[error("Fibre {number} out of range for a bundle of {count} fibres")]
    FibreOutOfRange { number: usize, count: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Atomic data error: {0}")]
    AtomicData(String),

    #[error("Sampling failed: {0}")]
    SamplingFailed(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DiagResult<T> = Result<T, DiagError>;
