use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPost;
use crate::repository::{ApplicationRepository, JobRepository};

const JOB_COLUMNS: &str = "id, owner_id, owner_credit_score, status, title, crop, task, \
     description, pay_rate, salary_type, salary_amount, location, location_district, date, \
     \"time\", required_workers, current_workers, terrain, commute_minutes, created_at, updated_at";

const APPLICATION_COLUMNS: &str =
    "id, job_id, worker_id, worker_name, worker_profile_snapshot, status, applied_at";

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn list(&self) -> Result<Vec<JobPost>> {
        let query = format!(
            "SELECT {} FROM jobs ORDER BY date DESC, created_at DESC",
            JOB_COLUMNS
        );
        let jobs = sqlx::query_as::<_, JobPost>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobPost>> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, JobPost>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn create(&self, job: JobPost) -> Result<JobPost> {
        let query = format!(
            r#"
            INSERT INTO jobs (
                owner_id, owner_credit_score, status, title, crop, task, description,
                pay_rate, salary_type, salary_amount, location, location_district,
                date, "time", required_workers, current_workers, terrain, commute_minutes
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18
            )
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let created = sqlx::query_as::<_, JobPost>(&query)
            .bind(&job.owner_id)
            .bind(job.owner_credit_score)
            .bind(job.status)
            .bind(&job.title)
            .bind(&job.crop)
            .bind(&job.task)
            .bind(&job.description)
            .bind(&job.pay_rate)
            .bind(job.salary_type)
            .bind(job.salary_amount)
            .bind(&job.location)
            .bind(&job.location_district)
            .bind(job.date)
            .bind(&job.time)
            .bind(job.required_workers)
            .bind(job.current_workers)
            .bind(job.terrain)
            .bind(job.commute_minutes)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, job: &JobPost) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs SET
                owner_credit_score = $2, status = $3, title = $4, crop = $5, task = $6,
                description = $7, pay_rate = $8, salary_type = $9, salary_amount = $10,
                location = $11, location_district = $12, date = $13, "time" = $14,
                required_workers = $15, current_workers = $16, terrain = $17,
                commute_minutes = $18, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.owner_credit_score)
        .bind(job.status)
        .bind(&job.title)
        .bind(&job.crop)
        .bind(&job.task)
        .bind(&job.description)
        .bind(&job.pay_rate)
        .bind(job.salary_type)
        .bind(job.salary_amount)
        .bind(&job.location)
        .bind(&job.location_district)
        .bind(job.date)
        .bind(&job.time)
        .bind(job.required_workers)
        .bind(job.current_workers)
        .bind(job.terrain)
        .bind(job.commute_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_workers_if_below_capacity(&self, id: Uuid) -> Result<bool> {
        // Single conditional update: the capacity check and the increment are
        // one statement, so concurrent accepts cannot both pass the gate.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET current_workers = current_workers + 1, updated_at = NOW()
            WHERE id = $1 AND current_workers < required_workers
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY applied_at ASC",
            APPLICATION_COLUMNS
        );
        let apps = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(apps)
    }

    async fn list_by_worker(&self, worker_id: &str) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE worker_id = $1 ORDER BY applied_at DESC",
            APPLICATION_COLUMNS
        );
        let apps = sqlx::query_as::<_, Application>(&query)
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(apps)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        let app = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    async fn exists_for(&self, job_id: Uuid, worker_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND worker_id = $2",
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create(&self, application: Application) -> Result<Application> {
        let query = format!(
            r#"
            INSERT INTO applications (
                job_id, worker_id, worker_name, worker_profile_snapshot, status, applied_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let created = sqlx::query_as::<_, Application>(&query)
            .bind(application.job_id)
            .bind(&application.worker_id)
            .bind(&application.worker_name)
            .bind(&application.worker_profile_snapshot)
            .bind(application.status)
            .bind(application.applied_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<()> {
        sqlx::query("UPDATE applications SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
