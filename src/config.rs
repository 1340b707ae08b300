use std::env;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Gcs,
    R2,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Without a database the server keeps everything in memory.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    /// Origin of the browser front-end; box QR codes point here.
    pub public_origin: String,
    pub storage: StorageKind,
    pub item_images_bucket: String,
    pub box_qrcodes_bucket: String,
    pub storage_public_base_url: Option<String>,
    pub r2_account_id: Option<String>,
    pub r2_access_key: Option<String>,
    pub r2_secret_key: Option<String>,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageKind::Memory,
            "gcs" => StorageKind::Gcs,
            "r2" => StorageKind::R2,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "STORAGE_BACKEND must be memory, gcs or r2 (got {})",
                    other
                )))
            }
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .unwrap_or(50051),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::InvalidInput("JWT_SECRET must be set".to_string()))?,
            public_origin: env::var("PUBLIC_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            storage,
            item_images_bucket: env::var("ITEM_IMAGES_BUCKET")
                .unwrap_or_else(|_| "item-images".to_string()),
            box_qrcodes_bucket: env::var("BOX_QRCODES_BUCKET")
                .unwrap_or_else(|_| "box-qrcodes".to_string()),
            storage_public_base_url: env::var("STORAGE_PUBLIC_BASE_URL").ok(),
            r2_account_id: env::var("R2_ACCOUNT_ID").ok(),
            r2_access_key: env::var("R2_ACCESS_KEY_ID").ok(),
            r2_secret_key: env::var("R2_SECRET_ACCESS_KEY").ok(),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
