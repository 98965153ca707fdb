mod config;
mod error;
mod mailer;
mod middleware;
mod models;
mod response;
mod routes;
mod services;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub mailer: Mailer,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::users::signup,
        routes::users::login,
        routes::users::list_users,
        routes::auth::refresh_token,
        routes::products::create_product,
        routes::products::list_products,
        routes::products::search_products,
        routes::products::get_product,
        routes::products::update_product,
        routes::products::delete_product,
        routes::ratings::add_rating,
        routes::ratings::list_product_ratings,
        routes::ratings::update_rating,
        routes::ratings::delete_rating,
        routes::events::create_event,
        routes::events::list_events,
        routes::events::get_event,
        routes::events::update_event,
        routes::events::delete_event,
    ),
    components(schemas(
        response::ApiResponse,
        error::FieldError,
        models::user::SignupRequest,
        models::user::LoginRequest,
        models::user::RefreshTokenRequest,
        models::user::UserProfile,
        models::user::AuthUserData,
        models::user::AuthTokens,
        models::product::Product,
        models::product::ProductCreateRequest,
        models::product::ProductUpdateRequest,
        models::product::ProductPage,
        models::rating::Rating,
        models::rating::RatingCreateRequest,
        models::rating::RatingUpdateRequest,
        models::event::EventCreateRequest,
        models::event::EventUpdateRequest,
        models::event::EventResponse,
        models::event::RepeatDetails,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Signup, login & user listing"),
        (name = "Auth", description = "Refresh token rotation"),
        (name = "Products", description = "Product catalog"),
        (name = "Ratings", description = "Product ratings"),
        (name = "Events", description = "Personal event records")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}

#[tokio::main]
async fn main() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bazaar_server=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    // DB must be reachable before the port is bound; failure here is fatal.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./src/db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let cors = if config.cors_origins == "*" || config.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(tower_http::cors::Any)
    };

    let mailer = Mailer::spawn(&config);
    let listen_addr = config.listen_addr.clone();
    let state = AppState {
        db: pool.clone(),
        config: Arc::new(config),
        mailer,
    };

    let app = routes::api_router(state)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!("Listening on {listen_addr}");
    tracing::info!("Swagger UI at http://{listen_addr}/api-docs/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Interrupt received: close the database connection before exiting.
    pool.close().await;
    tracing::info!("Database connection closed, exiting");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}
