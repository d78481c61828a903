use axum::{
    routing::{get, post},
    Router,
};
use farmwork_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/jobs",
            get(routes::job::list_jobs).post(routes::job::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(routes::job::get_job)
                .patch(routes::job::update_job)
                .delete(routes::job::close_job),
        )
        .route("/api/jobs/:id/apply", post(routes::application::apply_for_job))
        .route(
            "/api/jobs/:id/applications",
            get(routes::application::list_applications_for_job),
        )
        .route(
            "/api/applications/mine",
            get(routes::application::list_my_applications),
        )
        .route(
            "/api/applications/accepted",
            get(routes::application::accepted_status),
        )
        .route(
            "/api/applications/:id/decision",
            post(routes::application::decide_application),
        )
        .route("/api/chats", get(routes::chat::list_chat_rooms))
        .route(
            "/api/jobs/:id/messages",
            get(routes::chat::get_messages).post(routes::chat::send_message),
        )
        .route(
            "/api/jobs/:id/messages/stream",
            get(routes::chat::stream_messages),
        )
        .route("/api/assist/description", post(routes::assist::draft_description))
        .route("/api/assist/safety-tips", post(routes::assist::safety_tips))
        .route("/api/assist/parse", post(routes::assist::parse_job_request))
        .route("/api/catalog/districts", get(routes::catalog::list_districts))
        .route("/api/catalog/crops", get(routes::catalog::list_crops))
        .route("/api/catalog/tasks", get(routes::catalog::list_tasks))
        .route(
            "/api/catalog/time-windows",
            get(routes::catalog::list_time_windows),
        )
        .layer(axum::middleware::from_fn_with_state(
            farmwork_backend::middleware::rate_limit::new_rps_state(config.public_rps),
            farmwork_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
