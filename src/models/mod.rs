// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, Job, MatchResult, ParsedResume, normalize_whitespace};
pub use requests::{RankRequest, ParseResumeRequest};
pub use responses::{RankResponse, HealthResponse, ErrorResponse};
