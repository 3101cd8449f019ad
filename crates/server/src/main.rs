use database::{db::create_connection, services::user::UserService};
use log::{error, info};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use server::{
    app,
    auth::password::hash_password,
    config::{AdminSeed, Config},
    state::AppState,
    utils::shutdown::shutdown_signal,
};
use std::{error::Error, net::SocketAddr, process::ExitCode};

async fn seed_admin(db: &DatabaseConnection, seed: &AdminSeed) -> Result<(), Box<dyn Error>> {
    let password_hash = hash_password(&seed.password)?;
    if UserService::ensure_admin(db, &seed.name, &seed.email, password_hash)
        .await?
        .is_none()
    {
        info!("Admin account already present, skipping seed");
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    let db = create_connection(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    if let Some(seed) = &config.admin {
        seed_admin(&db, seed).await?;
    }
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db, config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}, docs at /swagger-ui");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
