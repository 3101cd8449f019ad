use crate::{auth::jwt::JwtAuth, config::Config, realtime::Hub, uploads::UploadStore};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub jwt: JwtAuth,
    pub hub: Hub,
    pub uploads: UploadStore,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> SharedState {
        let jwt = JwtAuth::new(config.jwt_secret.as_bytes(), config.jwt_expiry_hours);
        let uploads = UploadStore::new(config.upload_dir.clone());

        Arc::new(Self {
            db,
            config,
            jwt,
            hub: Hub::new(),
            uploads,
        })
    }
}
