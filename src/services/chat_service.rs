use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::ApplicationStatus;
use crate::models::job::{JobPost, JobStatus};
use crate::models::message::ChatMessage;
use crate::models::profile::UserRole;
use crate::repository::{ApplicationRepository, JobRepository};

const MESSAGE_COLUMNS: &str = "id, job_id, sender_id, sender_name, sender_role, content, sent_at";
const CHANNEL_CAPACITY: usize = 32;

/// Per-job message log with live delivery. Subscribers receive the full
/// room snapshot on every change; cancellation is dropping the receiver.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        job_id: Uuid,
        sender_id: &str,
        sender_name: &str,
        sender_role: UserRole,
        content: &str,
    ) -> Result<ChatMessage>;

    /// Messages for a room, ordered by timestamp ascending.
    async fn history(&self, job_id: Uuid) -> Result<Vec<ChatMessage>>;

    async fn subscribe(&self, job_id: Uuid) -> Result<broadcast::Receiver<Vec<ChatMessage>>>;

    async fn delete_room(&self, job_id: Uuid) -> Result<()>;
}

pub struct PgChatTransport {
    pool: PgPool,
    channels: Mutex<HashMap<Uuid, broadcast::Sender<Vec<ChatMessage>>>>,
}

impl PgChatTransport {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn notify(&self, job_id: Uuid, snapshot: Vec<ChatMessage>) {
        let channels = self.channels.lock().expect("channel map poisoned");
        if let Some(tx) = channels.get(&job_id) {
            let _ = tx.send(snapshot);
        }
    }
}

#[async_trait]
impl ChatTransport for PgChatTransport {
    async fn send(
        &self,
        job_id: Uuid,
        sender_id: &str,
        sender_name: &str,
        sender_role: UserRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let query = format!(
            r#"
            INSERT INTO chat_messages (job_id, sender_id, sender_name, sender_role, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );
        let message = sqlx::query_as::<_, ChatMessage>(&query)
            .bind(job_id)
            .bind(sender_id)
            .bind(sender_name)
            .bind(sender_role)
            .bind(content)
            .fetch_one(&self.pool)
            .await?;

        let snapshot = self.history(job_id).await?;
        self.notify(job_id, snapshot);
        Ok(message)
    }

    async fn history(&self, job_id: Uuid) -> Result<Vec<ChatMessage>> {
        let query = format!(
            "SELECT {} FROM chat_messages WHERE job_id = $1 ORDER BY sent_at ASC",
            MESSAGE_COLUMNS
        );
        let messages = sqlx::query_as::<_, ChatMessage>(&query)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    async fn subscribe(&self, job_id: Uuid) -> Result<broadcast::Receiver<Vec<ChatMessage>>> {
        let mut channels = self.channels.lock().expect("channel map poisoned");
        let tx = channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(tx.subscribe())
    }

    async fn delete_room(&self, job_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM chat_messages WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        self.notify(job_id, Vec::new());
        let mut channels = self.channels.lock().expect("channel map poisoned");
        channels.remove(&job_id);
        Ok(())
    }
}

/// Room membership is never stored; it is derived from job ownership and
/// accepted applications every time it is needed.
#[derive(Clone)]
pub struct ChatService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    transport: Arc<dyn ChatTransport>,
}

impl ChatService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            jobs,
            applications,
            transport,
        }
    }

    /// Active jobs the user owns, unioned with active jobs where the user's
    /// application is accepted, de-duplicated by job id.
    pub async fn list_rooms_for_user(&self, uid: &str) -> Result<Vec<JobPost>> {
        let jobs = self.jobs.list().await?;
        let applications = self.applications.list_by_worker(uid).await?;
        let accepted: HashSet<Uuid> = applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Accepted)
            .map(|a| a.job_id)
            .collect();

        let mut seen = HashSet::new();
        let rooms = jobs
            .into_iter()
            .filter(|job| job.status == JobStatus::Active)
            .filter(|job| job.owner_id == uid || accepted.contains(&job.id))
            .filter(|job| seen.insert(job.id))
            .collect();
        Ok(rooms)
    }

    /// A user may enter a room iff they own the job or hold an accepted
    /// application for it, and the job is still active.
    pub async fn resolve_access(&self, uid: &str, job_id: Uuid) -> Result<Option<UserRole>> {
        let Some(job) = self.jobs.get(job_id).await? else {
            return Ok(None);
        };
        if job.status != JobStatus::Active {
            return Ok(None);
        }
        if job.owner_id == uid {
            return Ok(Some(UserRole::Owner));
        }
        let applications = self.applications.list_by_worker(uid).await?;
        let accepted = applications
            .iter()
            .any(|a| a.job_id == job_id && a.status == ApplicationStatus::Accepted);
        Ok(accepted.then_some(UserRole::Worker))
    }

    pub async fn send_message(
        &self,
        uid: &str,
        sender_name: &str,
        job_id: Uuid,
        content: &str,
    ) -> Result<ChatMessage> {
        let Some(role) = self.resolve_access(uid, job_id).await? else {
            return Err(Error::Forbidden("no access to this chat room".to_string()));
        };
        self.transport
            .send(job_id, uid, sender_name, role, content)
            .await
    }

    pub async fn history(&self, uid: &str, job_id: Uuid) -> Result<Vec<ChatMessage>> {
        if self.resolve_access(uid, job_id).await?.is_none() {
            return Err(Error::Forbidden("no access to this chat room".to_string()));
        }
        self.transport.history(job_id).await
    }

    pub async fn subscribe(
        &self,
        uid: &str,
        job_id: Uuid,
    ) -> Result<(Vec<ChatMessage>, broadcast::Receiver<Vec<ChatMessage>>)> {
        if self.resolve_access(uid, job_id).await?.is_none() {
            return Err(Error::Forbidden("no access to this chat room".to_string()));
        }
        let receiver = self.transport.subscribe(job_id).await?;
        let initial = self.transport.history(job_id).await?;
        Ok((initial, receiver))
    }
}
