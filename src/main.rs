use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use ielts_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool)?;

    let base_routes = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh));

    let learner_api = Router::new()
        .route(
            "/api/profile",
            get(routes::auth::get_profile).put(routes::auth::update_profile),
        )
        .route("/api/tests", get(routes::reading::list_tests))
        .route("/api/tests/:id", get(routes::reading::get_test))
        .route("/api/tests/:id/submit", post(routes::reading::submit_test))
        .route("/api/results", get(routes::reading::list_results))
        .route("/api/results/:id", get(routes::reading::get_result))
        .route(
            "/api/listening-tests",
            get(routes::listening::list_tests),
        )
        .route(
            "/api/listening-tests/:id",
            get(routes::listening::get_test),
        )
        .route(
            "/api/listening-tests/:id/submit",
            post(routes::listening::submit_test),
        )
        .route(
            "/api/listening-results",
            get(routes::listening::list_results),
        )
        .route(
            "/api/listening-results/:id",
            get(routes::listening::get_result),
        )
        .route("/api/writing-tests", get(routes::writing::list_tests))
        .route("/api/writing-tests/:id", get(routes::writing::get_test))
        .route(
            "/api/writing-tests/:id/submit",
            post(routes::writing::submit_test),
        )
        .route(
            "/api/writing-results",
            get(routes::writing::list_submissions),
        )
        .route(
            "/api/writing-results/:id",
            get(routes::writing::get_submission),
        )
        .route("/api/stats", get(routes::stats::user_stats))
        .layer(axum::middleware::from_fn(
            ielts_backend::middleware::auth::require_auth,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/tests",
            post(routes::admin::create_reading_test),
        )
        .route(
            "/api/admin/tests/:id",
            patch(routes::admin::update_reading_test)
                .delete(routes::admin::delete_reading_test),
        )
        .route(
            "/api/admin/listening-tests",
            post(routes::admin::create_listening_test),
        )
        .route(
            "/api/admin/listening-tests/:id",
            patch(routes::admin::update_listening_test)
                .delete(routes::admin::delete_listening_test),
        )
        .route(
            "/api/admin/writing-tests",
            post(routes::admin::create_writing_test),
        )
        .route(
            "/api/admin/writing-tests/:id",
            patch(routes::admin::update_writing_test)
                .delete(routes::admin::delete_writing_test),
        )
        .route(
            "/api/admin/generate-test",
            post(routes::admin::generate_reading_test),
        )
        .route(
            "/api/admin/generate-listening-test",
            post(routes::admin::generate_listening_test),
        )
        .route(
            "/api/admin/generate-writing-test",
            post(routes::admin::generate_writing_test),
        )
        .layer(axum::middleware::from_fn(
            ielts_backend::middleware::auth::require_admin,
        ));

    info!("Serving media from: {}", config.media_dir);

    let app = base_routes
        .merge(learner_api)
        .merge(admin_api)
        .nest_service(
            "/media",
            tower_http::services::ServeDir::new(config.media_dir.clone()),
        )
        .with_state(app_state)
        .layer(axum::middleware::from_fn_with_state(
            ielts_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            ielts_backend::middleware::rate_limit::rps_middleware,
        ))
        .layer(ielts_backend::middleware::cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
