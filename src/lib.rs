// src/lib.rs

//! Tracks static-analysis issues of a file across analyses: each issue of
//! the current analysis is paired with the issue of the previous analysis
//! it continues, if any. See [`tracking::track`].

pub mod batch;
pub mod error;
pub mod line_hashes;
pub mod model;
pub mod report;
pub mod result;
pub mod tracking;

pub use error::{InputError, InvalidRuleKey, TrackingError};
pub use line_hashes::LineHashIndex;
pub use model::{PreviousIssue, RawIssue, RuleKey};
pub use result::TrackingResult;
pub use tracking::track;
