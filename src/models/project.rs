//! Project, pinshot, and pin models matching the frontend interfaces.

use serde::{Deserialize, Serialize};

use crate::placement::PinPosition;

/// Review status of a placed pin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PinStatus {
    #[default]
    Pending,
    Resolved,
}

impl PinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinStatus::Pending => "pending",
            PinStatus::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PinStatus::Pending),
            "resolved" => Some(PinStatus::Resolved),
            _ => None,
        }
    }
}

/// Pin marker color, restricted to the palette the editor offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PinColor {
    #[default]
    #[serde(rename = "#FF4D4F")]
    Red,
    #[serde(rename = "#52C41A")]
    Green,
    #[serde(rename = "#1890FF")]
    Blue,
}

impl PinColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinColor::Red => "#FF4D4F",
            PinColor::Green => "#52C41A",
            PinColor::Blue => "#1890FF",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "#FF4D4F" => Some(PinColor::Red),
            "#52C41A" => Some(PinColor::Green),
            "#1890FF" => Some(PinColor::Blue),
            _ => None,
        }
    }
}

/// A positioned comment marker on a pinshot's image.
///
/// Positions are percentages of the image bounds, always within [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub comment: String,
    pub status: PinStatus,
    pub color: PinColor,
}

impl Pin {
    /// Materialize a new pending pin at a validated position.
    pub fn new(position: PinPosition, comment: String, color: PinColor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            x: position.x(),
            y: position.y(),
            comment,
            status: PinStatus::Pending,
            color,
        }
    }
}

/// A single annotated screenshot within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pinshot {
    pub id: String,
    pub name: String,
    /// Data-URI payload or public object-storage URL; None until an image is attached
    pub image: Option<String>,
    pub pins: Vec<Pin>,
}

/// A named container of annotated screenshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub pinshots: Vec<Pinshot>,
}

/// Request body for creating a new project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
}

/// Request body for adding a pinshot to a project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinshotRequest {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Request body for placing a pin on a pinshot.
///
/// Carries the raw click coordinates (pixels, relative to the rendered image)
/// plus the rendered bounds; the server derives the percentage position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePinRequest {
    pub click_x: f64,
    pub click_y: f64,
    pub bounds_width: f64,
    pub bounds_height: f64,
    pub comment: String,
    #[serde(default)]
    pub color: Option<PinColor>,
}

/// Request body for changing a pin's status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinStatusRequest {
    pub status: PinStatus,
}

/// The active project marker kept alongside the project collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveProject {
    pub project_id: String,
}
