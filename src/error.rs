use thiserror::Error;

/// Failure classes of a scouting run.
///
/// Only `Persistence` (and a bad configuration) is meant to reach the
/// operator; the rest are recovered at the position or player they concern.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("data shape error in {scope}: {detail}")]
    DataShape { scope: String, detail: String },

    #[error("upstream returned no usable table for {scope}")]
    UpstreamEmpty { scope: String },

    #[error("no defense row for {team} at {position}")]
    MatchNotFound { team: String, position: String },

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScoutError {
    pub fn data_shape(scope: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DataShape {
            scope: scope.into(),
            detail: detail.into(),
        }
    }

    pub fn upstream_empty(scope: impl Into<String>) -> Self {
        Self::UpstreamEmpty {
            scope: scope.into(),
        }
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn match_not_found(team: impl Into<String>, position: impl std::fmt::Display) -> Self {
        Self::MatchNotFound {
            team: team.into(),
            position: position.to_string(),
        }
    }
}

pub type ScoutResult<T> = std::result::Result<T, ScoutError>;
