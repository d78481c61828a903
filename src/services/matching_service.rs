use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::dto::application_dto::Decision;
use crate::dto::job_dto::{JobListQuery, JobPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::catalog::{find_district, DEFAULT_TIME_WINDOW, OTHER_SENTINEL};
use crate::models::job::{JobPost, JobStatus, Terrain};
use crate::models::profile::WorkerProfile;
use crate::repository::{ApplicationRepository, JobRepository};
use crate::services::chat_service::ChatTransport;

const DEFAULT_CREDIT_SCORE: f64 = 4.8;

/// Job/application lifecycle rules. Stateless between calls; everything
/// durable goes through the repository contracts.
#[derive(Clone)]
pub struct MatchingService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    chat: Arc<dyn ChatTransport>,
}

struct ResolvedLocation {
    location: String,
    district: Option<String>,
}

impl MatchingService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        chat: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            jobs,
            applications,
            chat,
        }
    }

    /// Field checks shared by posting and editing. Reports the first failing
    /// field; nothing is persisted on failure.
    fn check_fields(payload: &JobPayload) -> Result<ResolvedLocation> {
        if payload.crop.trim().is_empty() || payload.crop == OTHER_SENTINEL {
            return Err(Error::InvalidField("crop"));
        }
        if payload.task.trim().is_empty() || payload.task == OTHER_SENTINEL {
            return Err(Error::InvalidField("task"));
        }
        if payload.salary_amount < 1 {
            return Err(Error::InvalidField("salary_amount"));
        }

        // Exactly one location representation: a known district (optionally
        // refined with a village), or a spelled-out address.
        let resolved = match (payload.district.as_deref(), payload.address.as_deref()) {
            (Some(district), None) => {
                let Some(known) = find_district(district) else {
                    return Err(Error::InvalidField("district"));
                };
                let village = payload.village.as_deref().unwrap_or("").trim();
                if village == OTHER_SENTINEL {
                    return Err(Error::InvalidField("village"));
                }
                ResolvedLocation {
                    location: format!("{}{}", known.name, village),
                    district: Some(known.name.to_string()),
                }
            }
            (None, Some(address)) if !address.trim().is_empty() => ResolvedLocation {
                location: address.trim().to_string(),
                district: None,
            },
            _ => return Err(Error::InvalidField("location")),
        };

        if payload.required_workers < 1 {
            return Err(Error::InvalidField("required_workers"));
        }
        Ok(resolved)
    }

    fn compose_pay_rate(payload: &JobPayload) -> String {
        format!("{} {}", payload.salary_type.label(), payload.salary_amount)
    }

    fn compose_description(payload: &JobPayload, pay_rate: &str) -> String {
        match payload.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!(
                "徵求{}{}人員，薪資{}。",
                payload.crop, payload.task, pay_rate
            ),
        }
    }

    fn compose_time(payload: &JobPayload) -> String {
        match payload.time.as_deref().map(str::trim) {
            Some(window) if !window.is_empty() && window != OTHER_SENTINEL => window.to_string(),
            _ => DEFAULT_TIME_WINDOW.to_string(),
        }
    }

    pub async fn post_job(&self, owner_id: &str, payload: JobPayload) -> Result<JobPost> {
        let resolved = Self::check_fields(&payload)?;
        let pay_rate = Self::compose_pay_rate(&payload);

        let job = JobPost {
            id: Uuid::nil(),
            owner_id: owner_id.to_string(),
            owner_credit_score: payload.owner_credit_score.unwrap_or(DEFAULT_CREDIT_SCORE),
            status: JobStatus::Active,
            title: format!("{} - {}", payload.crop, payload.task),
            description: Self::compose_description(&payload, &pay_rate),
            time: Self::compose_time(&payload),
            crop: payload.crop,
            task: payload.task,
            pay_rate,
            salary_type: payload.salary_type,
            salary_amount: payload.salary_amount,
            location: resolved.location,
            location_district: resolved.district,
            date: payload.date,
            required_workers: payload.required_workers,
            current_workers: 0,
            terrain: payload.terrain.unwrap_or(Terrain::Flat),
            commute_minutes: None,
            created_at: None,
            updated_at: None,
        };

        let created = self.jobs.create(job).await?;
        tracing::info!(job_id = %created.id, owner = %created.owner_id, "job posted");
        Ok(created)
    }

    pub async fn update_job(
        &self,
        job_id: Uuid,
        actor_id: &str,
        payload: JobPayload,
    ) -> Result<JobPost> {
        let existing = self.get_job(job_id).await?;
        if existing.owner_id != actor_id {
            return Err(Error::Forbidden(
                "only the job owner may edit this posting".to_string(),
            ));
        }

        let resolved = Self::check_fields(&payload)?;
        if payload.required_workers < existing.current_workers {
            // Capacity cannot shrink below the already-accepted headcount.
            return Err(Error::InvalidField("required_workers"));
        }
        let pay_rate = Self::compose_pay_rate(&payload);

        // The worker count is always carried over from the stored record so
        // an edit can never bypass the capacity accounting.
        let updated = JobPost {
            id: existing.id,
            owner_id: existing.owner_id.clone(),
            owner_credit_score: existing.owner_credit_score,
            status: existing.status,
            title: format!("{} - {}", payload.crop, payload.task),
            description: Self::compose_description(&payload, &pay_rate),
            time: Self::compose_time(&payload),
            crop: payload.crop,
            task: payload.task,
            pay_rate,
            salary_type: payload.salary_type,
            salary_amount: payload.salary_amount,
            location: resolved.location,
            location_district: resolved.district,
            date: payload.date,
            required_workers: payload.required_workers,
            current_workers: existing.current_workers,
            terrain: payload.terrain.unwrap_or(existing.terrain),
            commute_minutes: existing.commute_minutes,
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };

        self.jobs.update(&updated).await?;
        Ok(updated)
    }

    /// Deletes the posting and tears down its chat room. Teardown is
    /// best-effort: a leftover room without a job is a cleanup issue, so its
    /// failure never rolls back the deletion.
    pub async fn close_job(&self, job_id: Uuid, actor_id: &str) -> Result<()> {
        let existing = self.get_job(job_id).await?;
        if existing.owner_id != actor_id {
            return Err(Error::Forbidden(
                "only the job owner may close this posting".to_string(),
            ));
        }

        self.jobs.delete(job_id).await?;
        if let Err(err) = self.chat.delete_room(job_id).await {
            tracing::warn!(job_id = %job_id, error = ?err, "chat room teardown failed");
        }
        tracing::info!(job_id = %job_id, owner = %actor_id, "job closed");
        Ok(())
    }

    pub async fn apply_for_job(
        &self,
        job_id: Uuid,
        profile: WorkerProfile,
    ) -> Result<Application> {
        self.get_job(job_id).await?;

        if self.applications.exists_for(job_id, &profile.uid).await? {
            return Err(Error::Duplicate("already applied to this job".to_string()));
        }
        if self.has_accepted_application(&profile.uid).await? {
            return Err(Error::Conflict(
                "worker already holds an accepted job".to_string(),
            ));
        }

        let application = Application {
            id: Uuid::nil(),
            job_id,
            worker_id: profile.uid.clone(),
            worker_name: profile.full_name.clone(),
            worker_profile_snapshot: Json(profile),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        };
        let created = self.applications.create(application).await?;
        tracing::info!(job_id = %job_id, worker = %created.worker_id, "application submitted");
        Ok(created)
    }

    /// True while the worker has any accepted application. Backs the
    /// one-accepted-job-at-a-time rule.
    pub async fn has_accepted_application(&self, worker_id: &str) -> Result<bool> {
        let applications = self.applications.list_by_worker(worker_id).await?;
        Ok(applications
            .iter()
            .any(|a| a.status == ApplicationStatus::Accepted))
    }

    pub async fn decide_application(
        &self,
        app_id: Uuid,
        actor_id: &str,
        decision: Decision,
    ) -> Result<Application> {
        let mut application = self
            .applications
            .get(app_id)
            .await?
            .ok_or_else(|| Error::NotFound("application not found".to_string()))?;
        let job = self.get_job(application.job_id).await?;

        if job.owner_id != actor_id {
            return Err(Error::Forbidden(
                "only the job owner may decide applications".to_string(),
            ));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(Error::AlreadyDecided(
                "application has already been decided".to_string(),
            ));
        }

        match decision {
            Decision::Accept => {
                // The capacity-gated increment goes first; the status write
                // only proceeds once a slot is actually reserved. A crash in
                // between undercounts transiently but can never overcommit.
                let reserved = self
                    .jobs
                    .increment_workers_if_below_capacity(job.id)
                    .await?;
                if !reserved {
                    return Err(Error::Capacity("position filled".to_string()));
                }
                self.applications
                    .update_status(app_id, ApplicationStatus::Accepted)
                    .await?;
                application.status = ApplicationStatus::Accepted;
            }
            Decision::Reject => {
                self.applications
                    .update_status(app_id, ApplicationStatus::Rejected)
                    .await?;
                application.status = ApplicationStatus::Rejected;
            }
        }

        tracing::info!(
            application = %app_id,
            job_id = %job.id,
            status = ?application.status,
            "application decided"
        );
        Ok(application)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<JobPost> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("job no longer available".to_string()))
    }

    pub async fn list_jobs(&self, query: JobListQuery) -> Result<Vec<JobPost>> {
        let mut jobs = self.jobs.list().await?;

        if let Some(district) = query.district.filter(|d| !d.is_empty()) {
            jobs.retain(|job| {
                job.location.contains(&district)
                    || job.location_district.as_deref() == Some(district.as_str())
            });
        }
        if let Some(task) = query.task.filter(|t| !t.is_empty()) {
            jobs.retain(|job| job.task == task);
        }
        if let Some(min_salary) = query.min_salary {
            jobs.retain(|job| job.salary_amount >= min_salary);
        }
        if let Some(owner_id) = query.owner_id.filter(|o| !o.is_empty()) {
            jobs.retain(|job| job.owner_id == owner_id);
        }
        Ok(jobs)
    }

    /// Owner's review list for one posting.
    pub async fn applications_for_job(
        &self,
        job_id: Uuid,
        actor_id: &str,
    ) -> Result<Vec<Application>> {
        let job = self.get_job(job_id).await?;
        if job.owner_id != actor_id {
            return Err(Error::Forbidden(
                "only the job owner may review applications".to_string(),
            ));
        }
        self.applications.list_by_job(job_id).await
    }

    pub async fn applications_for_worker(&self, worker_id: &str) -> Result<Vec<Application>> {
        self.applications.list_by_worker(worker_id).await
    }
}
