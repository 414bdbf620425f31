//! Data models for the PinShot annotation tool.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod image;
mod project;
mod share;

pub use image::*;
pub use project::*;
pub use share::*;
