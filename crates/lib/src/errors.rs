use crate::types::PlatformKind;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a survey extraction.
///
/// Malformed embedded data is deliberately absent: strategies recover from it
/// locally and fall through to structural counting.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid survey URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("The {} form is not public; please enter its details manually", .platform.display_name())]
    FormNotPublic { platform: PlatformKind },

    #[error("All {attempts} proxies failed or returned implausibly short content")]
    AllProxiesExhausted { attempts: usize },

    #[error("Extraction did not finish within {0:?}")]
    ExtractionTimeout(Duration),

    #[error("No HTML fetcher was configured for the scanner")]
    MissingFetcher,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// What the caller should offer the user after a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// Retrying will not help; the survey fields must be filled in by hand.
    EnterManually,
    /// The failure may be transient; offer a retry alongside manual entry.
    RetryOrEnterManually,
}

impl ExtractError {
    pub fn user_action(&self) -> UserAction {
        match self {
            ExtractError::FormNotPublic { .. } | ExtractError::InvalidUrl { .. } => {
                UserAction::EnterManually
            }
            _ => UserAction::RetryOrEnterManually,
        }
    }
}
