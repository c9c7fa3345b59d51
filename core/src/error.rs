use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a start/grant request was refused. No state is mutated when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("province '{0}' not found")]
    UnknownProvince(String),

    #[error("country '{0}' not found")]
    UnknownCountry(String),

    #[error("province '{province_id}' already owned by {owner}")]
    ProvinceOwned { province_id: String, owner: String },

    #[error("colonist count {count} outside {min}..={max}")]
    ColonistCountOutOfRange { count: u32, min: u32, max: u32 },

    #[error("province '{province_id}' already has an active {family} task")]
    TaskAlreadyActive { province_id: String, family: &'static str },

    #[error("a project needs at least one worker")]
    NoWorkers,

    #[error("province '{province_id}' has {available} {class}, {requested} requested")]
    InsufficientPopulation {
        province_id: String,
        class: String,
        available: u64,
        requested: u64,
    },

    #[error("technology '{0}' not found")]
    UnknownTechnology(String),

    #[error("{country} already knows {technology}")]
    AlreadyKnown { country: String, technology: String },

    #[error("{country} lacks prerequisites for {technology}: {missing:?}")]
    PrerequisitesMissing {
        country: String,
        technology: String,
        missing: Vec<String>,
    },

    #[error("{country} is already researching {technology}")]
    ResearchAlreadyActive { country: String, technology: String },

    #[error("{country} has not finished researching {technology}")]
    ResearchNotComplete { country: String, technology: String },
}

pub type SimResult<T> = Result<T, SimError>;
