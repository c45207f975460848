//! Error taxonomy.
//!
//! Everything here is a configuration error or a programming error and is
//! fatal for the caller. Transient shortages (no eligible region, missing
//! rearm items) are not errors: the affected step is skipped and retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::enums::UfoStatus;

#[derive(Debug, Error)]
pub enum GeoscapeError {
    #[error("unknown alien mission `{0}`")]
    UnknownMission(String),
    #[error("unknown region `{0}`")]
    UnknownRegion(String),
    #[error("unknown alien race `{0}`")]
    UnknownRace(String),
    #[error("unknown UFO type `{0}`")]
    UnknownUfo(String),
    #[error("unknown UFO trajectory `{0}`")]
    UnknownTrajectory(String),
    #[error("unknown craft type `{0}`")]
    UnknownCraft(String),
    #[error("mission script label {label} is shared by `{first}` and `{second}`")]
    DuplicateLabel {
        label: u32,
        first: String,
        second: String,
    },
    #[error("illegal UFO status transition {from:?} -> {to:?}")]
    InvalidTransition { from: UfoStatus, to: UfoStatus },
    #[error("failed to parse ruleset: {0}")]
    RulesetParse(#[from] serde_json::Error),
    #[error("failed to read ruleset from {path:?}: {source}")]
    RulesetRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GeoscapeError {
    /// Errors caused by authored content rather than code.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, GeoscapeError::InvalidTransition { .. })
    }
}
