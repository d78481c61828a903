use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "salary_type", rename_all = "lowercase")]
pub enum SalaryType {
    Hourly,
    Daily,
}

impl SalaryType {
    /// Display label used in the composed pay string, e.g. "時薪 800".
    pub fn label(&self) -> &'static str {
        match self {
            SalaryType::Hourly => "時薪",
            SalaryType::Daily => "日薪",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "terrain_kind", rename_all = "lowercase")]
pub enum Terrain {
    Flat,
    Slope,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPost {
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
    pub terrain: Terrain,
    // Reserved for a commute estimate; never computed here.
    pub commute_minutes: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobPost {
    pub fn remaining_workers(&self) -> i32 {
        self.required_workers - self.current_workers
    }
}
