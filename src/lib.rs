pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use std::sync::Arc;

use reqwest::Client;
use sqlx::PgPool;

use crate::repository::postgres::{PgApplicationRepository, PgJobRepository};
use crate::repository::{ApplicationRepository, JobRepository};
use crate::services::assist_service::{AssistAdapter, GeminiAssist, NullAssist};
use crate::services::chat_service::{ChatService, ChatTransport, PgChatTransport};
use crate::services::matching_service::MatchingService;

#[derive(Clone)]
pub struct AppState {
    pub matching_service: MatchingService,
    pub chat_service: ChatService,
    pub assist_service: Arc<dyn AssistAdapter>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let assist_service: Arc<dyn AssistAdapter> = match config.gemini_api_key.clone() {
            Some(api_key) => Arc::new(GeminiAssist::new(api_key, http_client)),
            None => Arc::new(NullAssist),
        };

        let jobs: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool.clone()));
        let applications: Arc<dyn ApplicationRepository> =
            Arc::new(PgApplicationRepository::new(pool.clone()));
        let transport: Arc<dyn ChatTransport> = Arc::new(PgChatTransport::new(pool));

        Self::from_parts(jobs, applications, transport, assist_service)
    }

    /// Wires the services against any set of adapters. The test suite uses
    /// this with the in-memory implementations.
    pub fn from_parts(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        transport: Arc<dyn ChatTransport>,
        assist_service: Arc<dyn AssistAdapter>,
    ) -> Self {
        let matching_service =
            MatchingService::new(jobs.clone(), applications.clone(), transport.clone());
        let chat_service = ChatService::new(jobs, applications, transport);

        Self {
            matching_service,
            chat_service,
            assist_service,
        }
    }
}
