use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{JobPost, JobStatus, SalaryType, Terrain};

/// Full job submission, used both for posting and for editing. Server-managed
/// fields (id, owner, status, current worker count) are not accepted here;
/// anything extra in the request body is dropped on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobPayload {
    #[validate(length(min = 1))]
    pub crop: String,
    #[validate(length(min = 1))]
    pub task: String,
    #[serde(default)]
    pub description: Option<String>,
    pub salary_type: SalaryType,
    pub salary_amount: i32,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    pub required_workers: i32,
    #[serde(default)]
    pub terrain: Option<Terrain>,
    #[serde(default)]
    pub owner_credit_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub owner_credit_score: f64,
    pub status: JobStatus,
    pub title: String,
    pub crop: String,
    pub task: String,
    pub description: String,
    pub pay_rate: String,
    pub salary_type: SalaryType,
    pub salary_amount: i32,
    pub location: String,
    pub location_district: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub required_workers: i32,
    pub current_workers: i32,
    pub remaining_workers: i32,
    pub terrain: Terrain,
    pub commute_minutes: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<JobPost> for JobResponse {
    fn from(value: JobPost) -> Self {
        let remaining = value.remaining_workers();
        Self {
            id: value.id,
            owner_id: value.owner_id,
            owner_credit_score: value.owner_credit_score,
            status: value.status,
            title: value.title,
            crop: value.crop,
            task: value.task,
            description: value.description,
            pay_rate: value.pay_rate,
            salary_type: value.salary_type,
            salary_amount: value.salary_amount,
            location: value.location,
            location_district: value.location_district,
            date: value.date,
            time: value.time,
            required_workers: value.required_workers,
            current_workers: value.current_workers,
            remaining_workers: remaining,
            terrain: value.terrain,
            commute_minutes: value.commute_minutes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub district: Option<String>,
    pub task: Option<String>,
    pub min_salary: Option<i32>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
}
