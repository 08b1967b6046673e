use config::Config;
use repositories::{InMemoryPostRepo, PostRepository, PostgresRepo};
use routes::create_routes;
use services::{auth::AuthService, posts::PostLifecycleController};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod views;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub posts_controller: PostLifecycleController,
}

impl AppState {
    pub fn new(repo: Arc<dyn PostRepository>, auth_service: AuthService) -> Self {
        let posts_controller = PostLifecycleController::new(repo, Arc::new(auth_service.clone()));
        Self {
            auth_service,
            posts_controller,
        }
    }
}

fn init_tracing(json_logs: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn connect_repository(config: &Config) -> Arc<dyn PostRepository> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, posts are kept in memory and lost on restart");
        return Arc::new(InMemoryPostRepo::new());
    };

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
    {
        Ok(pool) => {
            info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let repo = PostgresRepo::new(pool);
    if let Err(err) = repo.migrate().await {
        error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }
    Arc::new(repo)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {:?}", err);
            std::process::exit(1);
        }
    };
    init_tracing(config.json_logs);

    let repo = connect_repository(&config).await;
    let auth_service = AuthService::new(
        config.jwt_secret.clone(),
        config.jwt_maxage,
        config.admin_email.clone(),
        config.admin_password_hash.clone(),
    );

    let app = create_routes(Arc::new(AppState::new(repo, auth_service)));

    let listener = match tokio::net::TcpListener::bind(format!("[::]:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };
    info!("Listening on port {}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {:?}", err);
    }
}
