//! Share link models and the read-only view shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Pin, Project};

/// A durable, resolvable reference granting read-only access to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub short_id: String,
    pub project_id: String,
    /// Full shareable URL composed from the public origin
    pub url: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ShareLink {
    /// A link is valid while it has no expiration or the expiration is
    /// strictly in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match &self.expires_at {
            None => true,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(expires) => expires > now,
                // Unparseable timestamp is treated as expired
                Err(_) => false,
            },
        }
    }
}

/// Request body for creating a share link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareLinkRequest {
    /// Whole days from now; None means the link never expires
    #[serde(default)]
    pub expiration_days: Option<i64>,
}

/// Request body for registering a migrated legacy link expiration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLegacyLinkRequest {
    pub link_id: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Query parameters for the legacy view route.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyViewQuery {
    /// Base64-encoded project JSON
    pub data: String,
    /// Legacy link id whose registered expiration applies to this view
    #[serde(default)]
    pub link: Option<String>,
}

/// A pin in the read-only view, annotated with its reveal delay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub comment: String,
    pub status: super::PinStatus,
    pub color: super::PinColor,
    pub reveal_delay_ms: u64,
}

/// A pinshot in the read-only view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinshotView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub pins: Vec<PinView>,
}

/// The read-only project snapshot returned to viewers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub pinshots: Vec<PinshotView>,
}

impl ProjectView {
    /// Build the view shape, assigning each pin a sequential reveal delay
    /// across the whole project.
    pub fn from_project(project: Project) -> Self {
        let mut index = 0usize;
        let pinshots = project
            .pinshots
            .into_iter()
            .map(|pinshot| {
                let pins = pinshot
                    .pins
                    .into_iter()
                    .map(|pin| {
                        let view = pin_view(pin, index);
                        index += 1;
                        view
                    })
                    .collect();
                PinshotView {
                    id: pinshot.id,
                    name: pinshot.name,
                    image: pinshot.image,
                    pins,
                }
            })
            .collect();

        ProjectView {
            id: project.id,
            name: project.name,
            pinshots,
        }
    }
}

fn pin_view(pin: Pin, index: usize) -> PinView {
    PinView {
        id: pin.id,
        x: pin.x,
        y: pin.y,
        comment: pin.comment,
        status: pin.status,
        color: pin.color,
        reveal_delay_ms: crate::share::reveal_delay_ms(index),
    }
}
