use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use farmwork_backend::dto::application_dto::Decision;
use farmwork_backend::dto::job_dto::JobPayload;
use farmwork_backend::error::Error;
use farmwork_backend::models::application::ApplicationStatus;
use farmwork_backend::models::job::{JobStatus, SalaryType};
use farmwork_backend::models::profile::{UserRole, WorkerProfile};
use farmwork_backend::repository::memory::{
    MemoryApplicationRepository, MemoryChatTransport, MemoryJobRepository,
};
use farmwork_backend::repository::{ApplicationRepository, JobRepository};
use farmwork_backend::services::chat_service::{ChatService, ChatTransport};
use farmwork_backend::services::matching_service::MatchingService;

struct Fixture {
    engine: MatchingService,
    chat: ChatService,
    jobs: Arc<MemoryJobRepository>,
    applications: Arc<MemoryApplicationRepository>,
    transport: Arc<MemoryChatTransport>,
}

fn fixture() -> Fixture {
    let jobs = Arc::new(MemoryJobRepository::new());
    let applications = Arc::new(MemoryApplicationRepository::new());
    let transport = Arc::new(MemoryChatTransport::new());
    let engine = MatchingService::new(jobs.clone(), applications.clone(), transport.clone());
    let chat = ChatService::new(jobs.clone(), applications.clone(), transport.clone());
    Fixture {
        engine,
        chat,
        jobs,
        applications,
        transport,
    }
}

fn pear_harvest() -> JobPayload {
    JobPayload {
        crop: "水梨".to_string(),
        task: "採收".to_string(),
        description: None,
        salary_type: SalaryType::Hourly,
        salary_amount: 200,
        district: Some("苗栗縣卓蘭鎮".to_string()),
        village: Some("老庄里".to_string()),
        address: None,
        date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        time: Some("08:00 - 12:00 (上午)".to_string()),
        required_workers: 2,
        terrain: None,
        owner_credit_score: None,
    }
}

fn worker(uid: &str, name: &str) -> WorkerProfile {
    WorkerProfile {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        photo_url: None,
        full_name: name.to_string(),
        gender: Some("female".to_string()),
        phone_number: "0987654321".to_string(),
        nationality: "印尼".to_string(),
        owned_orchards: None,
        skills: vec![],
        credit_score: 4.5,
    }
}

#[tokio::test]
async fn membership_follows_ownership_and_acceptance() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();

    let accepted = fx
        .engine
        .apply_for_job(job.id, worker("worker-1", "美玲"))
        .await
        .unwrap();
    fx.engine
        .decide_application(accepted.id, "owner-1", Decision::Accept)
        .await
        .unwrap();
    fx.engine
        .apply_for_job(job.id, worker("worker-2", "阿強"))
        .await
        .unwrap();

    let owner_rooms = fx.chat.list_rooms_for_user("owner-1").await.unwrap();
    assert_eq!(owner_rooms.len(), 1);
    assert_eq!(owner_rooms[0].id, job.id);

    let accepted_rooms = fx.chat.list_rooms_for_user("worker-1").await.unwrap();
    assert_eq!(accepted_rooms.len(), 1);
    assert_eq!(accepted_rooms[0].id, job.id);

    // Pending applicants and strangers see nothing.
    assert!(fx.chat.list_rooms_for_user("worker-2").await.unwrap().is_empty());
    assert!(fx.chat.list_rooms_for_user("worker-9").await.unwrap().is_empty());

    // Membership is derived, so undoing the acceptance directly in storage
    // removes the room on the next computation.
    fx.applications
        .update_status(accepted.id, ApplicationStatus::Rejected)
        .await
        .unwrap();
    assert!(fx.chat.list_rooms_for_user("worker-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_jobs_carry_no_rooms() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();

    let mut stored = fx.jobs.get(job.id).await.unwrap().unwrap();
    stored.status = JobStatus::Completed;
    fx.jobs.update(&stored).await.unwrap();

    assert!(fx.chat.list_rooms_for_user("owner-1").await.unwrap().is_empty());
    assert!(fx
        .chat
        .resolve_access("owner-1", job.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn access_resolution_assigns_roles() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();
    let application = fx
        .engine
        .apply_for_job(job.id, worker("worker-1", "美玲"))
        .await
        .unwrap();

    assert_eq!(
        fx.chat.resolve_access("owner-1", job.id).await.unwrap(),
        Some(UserRole::Owner)
    );
    // Pending application grants nothing yet.
    assert_eq!(fx.chat.resolve_access("worker-1", job.id).await.unwrap(), None);

    fx.engine
        .decide_application(application.id, "owner-1", Decision::Accept)
        .await
        .unwrap();
    assert_eq!(
        fx.chat.resolve_access("worker-1", job.id).await.unwrap(),
        Some(UserRole::Worker)
    );

    assert_eq!(
        fx.chat
            .resolve_access("worker-1", Uuid::new_v4())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn messaging_is_gated_by_membership() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();
    let application = fx
        .engine
        .apply_for_job(job.id, worker("worker-1", "美玲"))
        .await
        .unwrap();
    fx.engine
        .decide_application(application.id, "owner-1", Decision::Accept)
        .await
        .unwrap();

    let err = fx
        .chat
        .send_message("worker-9", "路人", job.id, "hello?")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let first = fx
        .chat
        .send_message("owner-1", "張老闆", job.id, "明天早上七點集合")
        .await
        .unwrap();
    assert_eq!(first.sender_role, UserRole::Owner);

    let reply = fx
        .chat
        .send_message("worker-1", "美玲", job.id, "好的，準時到")
        .await
        .unwrap();
    assert_eq!(reply.sender_role, UserRole::Worker);

    let history = fx.chat.history("worker-1", job.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].sent_at <= history[1].sent_at);
    assert_eq!(history[0].content, "明天早上七點集合");
}

#[tokio::test]
async fn subscribers_receive_full_snapshots() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();

    let (initial, mut receiver) = fx.chat.subscribe("owner-1", job.id).await.unwrap();
    assert!(initial.is_empty());

    fx.chat
        .send_message("owner-1", "張老闆", job.id, "開始囉")
        .await
        .unwrap();

    let snapshot = receiver.recv().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].content, "開始囉");
}

#[tokio::test]
async fn closing_a_job_cascades_to_its_room() {
    let fx = fixture();
    let job = fx.engine.post_job("owner-1", pear_harvest()).await.unwrap();
    let application = fx
        .engine
        .apply_for_job(job.id, worker("worker-1", "美玲"))
        .await
        .unwrap();
    fx.engine
        .decide_application(application.id, "owner-1", Decision::Accept)
        .await
        .unwrap();
    fx.chat
        .send_message("owner-1", "張老闆", job.id, "先聊聊")
        .await
        .unwrap();

    fx.engine.close_job(job.id, "owner-1").await.unwrap();

    assert!(fx.jobs.list().await.unwrap().is_empty());
    assert_eq!(fx.chat.resolve_access("owner-1", job.id).await.unwrap(), None);
    assert_eq!(fx.chat.resolve_access("worker-1", job.id).await.unwrap(), None);
    assert!(fx.transport.deleted_rooms().contains(&job.id));
    assert!(fx.transport.history(job.id).await.unwrap().is_empty());
}
