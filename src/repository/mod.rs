pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPost;

/// Storage contract for job postings. Implementations are thin adapters;
/// capacity rules live in the matching engine, except for the conditional
/// increment, which must be a single atomic operation at the storage layer.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All postings, ordered by work date descending.
    async fn list(&self) -> Result<Vec<JobPost>>;

    async fn get(&self, id: Uuid) -> Result<Option<JobPost>>;

    /// Persists a new posting and assigns its id.
    async fn create(&self, job: JobPost) -> Result<JobPost>;

    async fn update(&self, job: &JobPost) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Increments `current_workers` by one only while it is below
    /// `required_workers`. Returns false, changing nothing, when the job is
    /// already at capacity. Check and increment happen as one atomic step.
    async fn increment_workers_if_below_capacity(&self, id: Uuid) -> Result<bool>;
}

/// Storage contract for worker applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Application>>;

    async fn list_by_worker(&self, worker_id: &str) -> Result<Vec<Application>>;

    async fn get(&self, id: Uuid) -> Result<Option<Application>>;

    async fn exists_for(&self, job_id: Uuid, worker_id: &str) -> Result<bool>;

    /// Persists a new application and assigns its id.
    async fn create(&self, application: Application) -> Result<Application>;

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<()>;
}
