//! Shared image and comment models for the standalone image flow.

use serde::{Deserialize, Serialize};

/// An uploaded image registered for sharing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedImage {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub storage_path: String,
    pub created_at: String,
}

/// A comment on a shared image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageComment {
    pub id: String,
    pub content: String,
    pub author_name: String,
    pub created_at: String,
}

/// A shared image together with its comments, fetched in one call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageWithComments {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub created_at: String,
    pub comments: Vec<ImageComment>,
}

/// Request body for posting a comment on a shared image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    /// Defaults to "Anonymous" when omitted
    #[serde(default)]
    pub author_name: Option<String>,
}
