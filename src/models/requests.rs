use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::Candidate;

/// Request to rank candidates against a job description
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[serde(alias = "job_description", rename = "jobDescription", default)]
    pub job_description: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to pull candidate details out of plain résumé text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParseResumeRequest {
    #[validate(length(min = 1))]
    pub text: String,
}
