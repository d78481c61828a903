use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::profile::WorkerProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub profile: WorkerProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPayload {
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub worker_id: String,
    pub worker_name: String,
    pub worker_profile_snapshot: WorkerProfile,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            worker_id: value.worker_id,
            worker_name: value.worker_name,
            worker_profile_snapshot: value.worker_profile_snapshot.0,
            status: value.status,
            applied_at: value.applied_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub id: Uuid,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedStatusResponse {
    pub has_accepted: bool,
}
