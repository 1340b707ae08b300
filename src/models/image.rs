use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ImageModel {
    pub id: String,
    pub item_id: String,
    /// Object key inside the item image bucket.
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub item_id: String,
    pub storage_path: String,
}
