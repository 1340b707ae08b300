use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ImageModel;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ItemModel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub box_id: String,
    pub category: Option<String>,
    pub date_stored: DateTime<Utc>,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithImages {
    #[serde(flatten)]
    pub record: ItemModel,
    pub images: Vec<ImageModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub box_id: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Defaults to the insert time.
    pub date_stored: Option<DateTime<Utc>>,
    pub barcode: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, box_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            box_id: box_id.into(),
            description: None,
            category: None,
            date_stored: None,
            barcode: None,
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

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }
}

/// Partial update, same conventions as [`super::BoxChanges`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub box_id: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub date_stored: Option<DateTime<Utc>>,
    pub barcode: Option<Option<String>>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.box_id.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date_stored.is_none()
            && self.barcode.is_none()
    }

    pub fn apply(&self, target: &mut ItemModel) {
        if let Some(name) = &self.name {
            target.name = name.clone();
        }
        if let Some(box_id) = &self.box_id {
            target.box_id = box_id.clone();
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        if let Some(category) = &self.category {
            target.category = category.clone();
        }
        if let Some(date_stored) = self.date_stored {
            target.date_stored = date_stored;
        }
        if let Some(barcode) = &self.barcode {
            target.barcode = barcode.clone();
        }
    }
}
