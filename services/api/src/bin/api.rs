//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        activities::{
            create_activity_handler, delete_activity_handler, get_activity_handler,
            list_activities_handler, update_activity_handler,
        },
        auth::{login_handler, logout_handler, register_handler, tokencheck_handler},
        groups::{
            create_group_handler, get_group_handler, list_groups_handler, update_group_handler,
        },
        meetings::{
            add_activity_handler, cancel_meeting_handler, clear_activities_handler,
            create_meeting_handler, upcoming_meetings_handler,
        },
        members::{
            create_member_handler, delete_member_handler, list_members_handler,
            update_member_handler,
        },
        require_auth, require_stamm,
        rest::ApiDoc,
        state::AppState,
    },
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use camptime_core::MeetingService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter.clone(),
        meetings: MeetingService::new(db_adapter),
        config: config.clone(),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/tokencheck", post(tokencheck_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (valid token and an assigned stamm required).
    // Layers run bottom-up: require_auth first, then require_stamm.
    let protected_routes = Router::new()
        .route("/groups", get(list_groups_handler).post(create_group_handler))
        .route("/groups/{id}", get(get_group_handler).put(update_group_handler))
        .route("/members", get(list_members_handler).post(create_member_handler))
        .route(
            "/members/{id}",
            put(update_member_handler).delete(delete_member_handler),
        )
        .route(
            "/activities",
            get(list_activities_handler).post(create_activity_handler),
        )
        .route(
            "/activities/{id}",
            get(get_activity_handler)
                .put(update_activity_handler)
                .delete(delete_activity_handler),
        )
        .route(
            "/meetings",
            get(upcoming_meetings_handler).post(create_meeting_handler),
        )
        .route("/meetings/activity", post(add_activity_handler))
        .route("/meetings/{id}/cancel", post(cancel_meeting_handler))
        .route("/meetings/{id}/activities", delete(clear_activities_handler))
        .layer(axum_middleware::from_fn(require_stamm))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .nest("/api", api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
