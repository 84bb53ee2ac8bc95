use crate::entities::{Theme, page_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page content as submitted by the builder form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub couple_names: Option<String>,
    /// Local date-time, `YYYY-MM-DDTHH:MM`
    pub start_date: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    /// Encoded image payloads (data URLs)
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "youtubeUrl")]
    pub video_url: Option<String>,
}

impl PageData {
    pub fn couple_names(&self) -> Option<&str> {
        self.couple_names
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePageDataRequest {
    pub session_id: String,
    pub page_data: Option<PageData>,
}

/// A persisted draft, as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPage {
    pub session_id: String,
    pub couple_names: Option<String>,
    pub message: Option<String>,
    pub start_date: Option<String>,
    pub theme: Theme,
    /// Kept raw so that malformed rows can be reported instead of dropped
    pub images: serde_json::Value,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftPage {
    /// Images as strings, `None` when the stored value is not an array of strings
    pub fn image_list(&self) -> Option<Vec<String>> {
        match &self.images {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

impl From<page_entity::Model> for DraftPage {
    fn from(m: page_entity::Model) -> Self {
        Self {
            session_id: m.session_id,
            couple_names: m.couple_names,
            message: m.message,
            start_date: m.start_date,
            theme: m.theme,
            images: m.images,
            video_url: m.video_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
