//! Mutex-guarded in-memory adapters. They back the test suite and keep the
//! same atomicity guarantees the Postgres adapters provide: the capacity
//! gate is checked and applied under a single lock acquisition.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPost;
use crate::models::message::ChatMessage;
use crate::models::profile::UserRole;
use crate::repository::{ApplicationRepository, JobRepository};
use crate::services::chat_service::ChatTransport;

#[derive(Default)]
pub struct MemoryJobRepository {
    jobs: Mutex<HashMap<Uuid, JobPost>>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn list(&self) -> Result<Vec<JobPost>> {
        let jobs = self.jobs.lock().expect("job store poisoned");
        let mut all: Vec<JobPost> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobPost>> {
        let jobs = self.jobs.lock().expect("job store poisoned");
        Ok(jobs.get(&id).cloned())
    }

    async fn create(&self, mut job: JobPost) -> Result<JobPost> {
        let mut jobs = self.jobs.lock().expect("job store poisoned");
        job.id = Uuid::new_v4();
        let now = Utc::now();
        job.created_at = Some(now);
        job.updated_at = Some(now);
        jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update(&self, job: &JobPost) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job store poisoned");
        match jobs.get_mut(&job.id) {
            Some(existing) => {
                let mut updated = job.clone();
                updated.updated_at = Some(Utc::now());
                *existing = updated;
                Ok(())
            }
            None => Err(Error::NotFound("job not found".to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job store poisoned");
        jobs.remove(&id);
        Ok(())
    }

    async fn increment_workers_if_below_capacity(&self, id: Uuid) -> Result<bool> {
        let mut jobs = self.jobs.lock().expect("job store poisoned");
        let Some(job) = jobs.get_mut(&id) else {
            return Ok(false);
        };
        if job.current_workers < job.required_workers {
            job.current_workers += 1;
            job.updated_at = Some(Utc::now());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[derive(Default)]
pub struct MemoryApplicationRepository {
    applications: Mutex<HashMap<Uuid, Application>>,
}

impl MemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplicationRepository {
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let apps = self.applications.lock().expect("application store poisoned");
        let mut matching: Vec<Application> = apps
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        Ok(matching)
    }

    async fn list_by_worker(&self, worker_id: &str) -> Result<Vec<Application>> {
        let apps = self.applications.lock().expect("application store poisoned");
        let mut matching: Vec<Application> = apps
            .values()
            .filter(|a| a.worker_id == worker_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(matching)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let apps = self.applications.lock().expect("application store poisoned");
        Ok(apps.get(&id).cloned())
    }

    async fn exists_for(&self, job_id: Uuid, worker_id: &str) -> Result<bool> {
        let apps = self.applications.lock().expect("application store poisoned");
        Ok(apps
            .values()
            .any(|a| a.job_id == job_id && a.worker_id == worker_id))
    }

    async fn create(&self, mut application: Application) -> Result<Application> {
        let mut apps = self.applications.lock().expect("application store poisoned");
        application.id = Uuid::new_v4();
        apps.insert(application.id, application.clone());
        Ok(application)
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<()> {
        let mut apps = self.applications.lock().expect("application store poisoned");
        match apps.get_mut(&id) {
            Some(app) => {
                app.status = status;
                Ok(())
            }
            None => Err(Error::NotFound("application not found".to_string())),
        }
    }
}

/// In-process chat transport. Keeps full per-room logs and remembers which
/// rooms were torn down, which the cascade tests assert on.
#[derive(Default)]
pub struct MemoryChatTransport {
    rooms: Mutex<HashMap<Uuid, Vec<ChatMessage>>>,
    channels: Mutex<HashMap<Uuid, broadcast::Sender<Vec<ChatMessage>>>>,
    deleted: Mutex<Vec<Uuid>>,
}

impl MemoryChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted_rooms(&self) -> Vec<Uuid> {
        self.deleted.lock().expect("teardown log poisoned").clone()
    }

    fn notify(&self, job_id: Uuid, snapshot: Vec<ChatMessage>) {
        let channels = self.channels.lock().expect("channel map poisoned");
        if let Some(tx) = channels.get(&job_id) {
            let _ = tx.send(snapshot);
        }
    }
}

#[async_trait]
impl ChatTransport for MemoryChatTransport {
    async fn send(
        &self,
        job_id: Uuid,
        sender_id: &str,
        sender_name: &str,
        sender_role: UserRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            job_id,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            sender_role,
            content: content.to_string(),
            sent_at: Utc::now(),
        };
        let snapshot = {
            let mut rooms = self.rooms.lock().expect("room store poisoned");
            let log = rooms.entry(job_id).or_default();
            log.push(message.clone());
            log.clone()
        };
        self.notify(job_id, snapshot);
        Ok(message)
    }

    async fn history(&self, job_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rooms = self.rooms.lock().expect("room store poisoned");
        Ok(rooms.get(&job_id).cloned().unwrap_or_default())
    }

    async fn subscribe(&self, job_id: Uuid) -> Result<broadcast::Receiver<Vec<ChatMessage>>> {
        let mut channels = self.channels.lock().expect("channel map poisoned");
        let tx = channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(32).0);
        Ok(tx.subscribe())
    }

    async fn delete_room(&self, job_id: Uuid) -> Result<()> {
        {
            let mut rooms = self.rooms.lock().expect("room store poisoned");
            rooms.remove(&job_id);
        }
        {
            let mut deleted = self.deleted.lock().expect("teardown log poisoned");
            deleted.push(job_id);
        }
        self.notify(job_id, Vec::new());
        let mut channels = self.channels.lock().expect("channel map poisoned");
        channels.remove(&job_id);
        Ok(())
    }
}
