use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DraftDescriptionPayload {
    #[validate(length(min = 1))]
    pub crop: String,
    #[validate(length(min = 1))]
    pub task: String,
    #[validate(length(min = 1))]
    pub pay: String,
    #[validate(length(min = 1))]
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftDescriptionResponse {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SafetyTipsPayload {
    #[validate(length(min = 1))]
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyTipsResponse {
    pub tips: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParseRequestPayload {
    #[validate(length(min = 1))]
    pub input: String,
}

/// Structured fields extracted from a free-text request. Everything is
/// optional except what the extraction model is required to produce; the
/// caller feeds these into the normal posting flow, where full validation
/// applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJobFields {
    pub crop: Option<String>,
    pub task: Option<String>,
    pub location_district: Option<String>,
    pub salary_type: Option<String>,
    pub salary_amount: Option<i32>,
    pub required_workers: Option<i32>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub terrain: Option<String>,
    pub notes_summary: Option<String>,
}
