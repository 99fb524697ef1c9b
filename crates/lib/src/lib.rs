//! # formscout
//!
//! Recovers structured metadata (title, description, question and section
//! counts, personal-data risk) from third-party survey pages.
//!
//! The crate is organised leaf-first:
//!
//! - [`detect`] classifies a URL into a [`PlatformKind`].
//! - [`platforms`] holds one [`SurveyExtractor`] per platform, each running a
//!   layered [`pipeline::CountPipeline`] over the fetched HTML.
//! - [`privacy`] flags questions that solicit personal data.
//! - [`scanner`] wires detection, fetching and extraction together under a deadline.
//!
//! Fetching itself is abstracted behind [`HtmlFetcher`]; the `formscout-web`
//! crate provides the proxy-backed implementation.

pub mod detect;
pub mod errors;
pub mod fetch;
pub mod pipeline;
pub mod platforms;
pub mod privacy;
pub mod report;
pub mod scanner;
pub mod types;

pub use detect::detect;
pub use errors::{ExtractError, UserAction};
pub use fetch::HtmlFetcher;
pub use platforms::{ExtractorRegistry, SurveyExtractor};
pub use privacy::{PersonalDataCategory, PersonalDataReport};
pub use scanner::{ScannerConfig, SurveyScanner, SurveyScannerBuilder};
pub use types::{
    ExtractionRequest, PlatformKind, QuestionCount, SurveyInfo, DEFAULT_QUESTION_COUNT,
    MIN_PLAUSIBLE_BODY_LEN, NOT_AVAILABLE,
};
