use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ItemModel, Location};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BoxModel {
    pub id: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub location: Location,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub qr_code_id: String,
    pub user_id: String,
}

/// A box together with the items stored in it, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxWithItems {
    #[serde(flatten)]
    pub record: BoxModel,
    pub items: Vec<ItemModel>,
}

/// Insert payload. Identifier, timestamps, owner and QR code id are assigned
/// on insert and cannot be supplied here.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBox {
    pub name: String,
    pub location: Location,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl NewBox {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            category: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. `None` leaves a column unchanged; for nullable columns
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxChanges {
    pub name: Option<String>,
    pub location: Option<Location>,
    pub category: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl BoxChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }

    pub fn apply(&self, target: &mut BoxModel) {
        if let Some(name) = &self.name {
            target.name = name.clone();
        }
        if let Some(location) = self.location {
            target.location = location;
        }
        if let Some(category) = &self.category {
            target.category = category.clone();
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
    }
}
