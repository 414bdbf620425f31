//! Pin placement state machine.
//!
//! Models the two-step placement flow: a click on the image surface captures a
//! candidate position, a non-empty comment confirms it into a pin. At most one
//! pending placement exists at a time, and a pending placement never coexists
//! with an open pin bubble.

use crate::models::{Pin, PinColor};

/// Rendered size of the image surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBounds {
    width: f64,
    height: f64,
}

impl ImageBounds {
    /// Bounds must be positive and finite.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Some(Self { width, height })
        } else {
            None
        }
    }
}

/// A click position in pixels, relative to the image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

/// A normalized pin position, both axes within [0, 100].
///
/// The only ways to obtain one are the checked constructors, so any stored pin
/// position satisfies the range invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinPosition {
    x: f64,
    y: f64,
}

impl PinPosition {
    /// Validate percentage coordinates.
    pub fn new(x: f64, y: f64) -> Option<Self> {
        if x.is_finite() && y.is_finite() && (0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y)
        {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Convert a click inside the rendered bounds to percentages.
    /// Clicks outside the image surface yield no position.
    pub fn from_click(click: ClickPoint, bounds: ImageBounds) -> Option<Self> {
        let x = (click.x / bounds.width) * 100.0;
        let y = (click.y / bounds.height) * 100.0;
        Self::new(x, y)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// A candidate pin awaiting its comment.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPin {
    pub position: PinPosition,
    pub comment: String,
    pub color: PinColor,
}

/// Result of a click on the image surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A pending placement was started at the clicked position
    PlacementStarted,
    /// An open pin bubble was closed instead of starting a placement
    SelectionCleared,
    /// The click fell outside the image surface and was ignored
    OutsideImage,
}

/// Interaction state for one editing session: either idle or holding a single
/// pending placement, plus the currently selected (bubble-open) pin.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pending: Option<PendingPin>,
    selected_pin: Option<String>,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingPin> {
        self.pending.as_ref()
    }

    pub fn selected_pin(&self) -> Option<&str> {
        self.selected_pin.as_deref()
    }

    /// Handle a click on the image surface.
    ///
    /// If a pin bubble is open the click closes it without starting a
    /// placement; otherwise a click inside the bounds starts one.
    pub fn click_image(&mut self, click: ClickPoint, bounds: ImageBounds) -> ClickOutcome {
        if self.selected_pin.take().is_some() {
            return ClickOutcome::SelectionCleared;
        }

        match PinPosition::from_click(click, bounds) {
            Some(position) => {
                self.pending = Some(PendingPin {
                    position,
                    comment: String::new(),
                    color: PinColor::default(),
                });
                ClickOutcome::PlacementStarted
            }
            None => ClickOutcome::OutsideImage,
        }
    }

    /// Select an existing pin, discarding any pending placement.
    pub fn select_pin(&mut self, pin_id: &str) {
        self.pending = None;
        self.selected_pin = Some(pin_id.to_string());
    }

    /// Update the draft comment of the pending placement.
    pub fn set_comment(&mut self, comment: &str) {
        if let Some(pending) = &mut self.pending {
            pending.comment = comment.to_string();
        }
    }

    /// Pick a color for the pending placement.
    pub fn set_color(&mut self, color: PinColor) {
        if let Some(pending) = &mut self.pending {
            pending.color = color;
        }
    }

    /// Confirm the pending placement into a pin.
    ///
    /// Requires a pending placement with a non-empty comment; on success the
    /// machine returns to idle.
    pub fn confirm(&mut self) -> Option<Pin> {
        let pending = self.pending.as_ref()?;
        if pending.comment.trim().is_empty() {
            return None;
        }
        let pending = self.pending.take()?;
        Some(Pin::new(pending.position, pending.comment, pending.color))
    }

    /// Discard the pending placement and return to idle.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PinStatus;

    fn bounds() -> ImageBounds {
        ImageBounds::new(800.0, 600.0).unwrap()
    }

    #[test]
    fn test_click_inside_bounds_normalizes_to_percentages() {
        let position =
            PinPosition::from_click(ClickPoint { x: 200.0, y: 240.0 }, bounds()).unwrap();
        assert!((position.x() - 25.0).abs() < 1e-9);
        assert!((position.y() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_outside_bounds_is_rejected() {
        assert!(PinPosition::from_click(ClickPoint { x: 801.0, y: 10.0 }, bounds()).is_none());
        assert!(PinPosition::from_click(ClickPoint { x: -1.0, y: 10.0 }, bounds()).is_none());
        assert!(PinPosition::from_click(ClickPoint { x: 10.0, y: 600.5 }, bounds()).is_none());
    }

    #[test]
    fn test_corner_clicks_stay_in_range() {
        let origin = PinPosition::from_click(ClickPoint { x: 0.0, y: 0.0 }, bounds()).unwrap();
        assert_eq!((origin.x(), origin.y()), (0.0, 0.0));

        let corner = PinPosition::from_click(ClickPoint { x: 800.0, y: 600.0 }, bounds()).unwrap();
        assert_eq!((corner.x(), corner.y()), (100.0, 100.0));
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert!(ImageBounds::new(0.0, 600.0).is_none());
        assert!(ImageBounds::new(800.0, -1.0).is_none());
        assert!(ImageBounds::new(f64::NAN, 600.0).is_none());
    }

    #[test]
    fn test_placement_flow_confirm() {
        let mut placement = Placement::new();
        let outcome = placement.click_image(ClickPoint { x: 200.0, y: 240.0 }, bounds());
        assert_eq!(outcome, ClickOutcome::PlacementStarted);

        placement.set_comment("button misaligned");
        let pin = placement.confirm().unwrap();
        assert!((pin.x - 25.0).abs() < 1e-9);
        assert!((pin.y - 40.0).abs() < 1e-9);
        assert_eq!(pin.comment, "button misaligned");
        assert_eq!(pin.status, PinStatus::Pending);
        assert!(placement.pending().is_none());
    }

    #[test]
    fn test_confirm_requires_comment() {
        let mut placement = Placement::new();
        placement.click_image(ClickPoint { x: 100.0, y: 100.0 }, bounds());

        assert!(placement.confirm().is_none());
        placement.set_comment("   ");
        assert!(placement.confirm().is_none());
        // The draft survives a rejected confirm
        assert!(placement.pending().is_some());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut placement = Placement::new();
        placement.click_image(ClickPoint { x: 100.0, y: 100.0 }, bounds());
        placement.set_comment("draft");
        placement.cancel();
        assert!(placement.pending().is_none());
        assert!(placement.confirm().is_none());
    }

    #[test]
    fn test_selection_and_pending_are_exclusive() {
        let mut placement = Placement::new();
        placement.click_image(ClickPoint { x: 100.0, y: 100.0 }, bounds());
        assert!(placement.pending().is_some());

        placement.select_pin("pin-1");
        assert!(placement.pending().is_none());
        assert_eq!(placement.selected_pin(), Some("pin-1"));
    }

    #[test]
    fn test_click_with_open_bubble_closes_it_without_placing() {
        let mut placement = Placement::new();
        placement.select_pin("pin-1");

        let outcome = placement.click_image(ClickPoint { x: 100.0, y: 100.0 }, bounds());
        assert_eq!(outcome, ClickOutcome::SelectionCleared);
        assert!(placement.selected_pin().is_none());
        assert!(placement.pending().is_none());
    }

    #[test]
    fn test_outside_click_leaves_state_untouched() {
        let mut placement = Placement::new();
        let outcome = placement.click_image(ClickPoint { x: 900.0, y: 100.0 }, bounds());
        assert_eq!(outcome, ClickOutcome::OutsideImage);
        assert!(placement.pending().is_none());
    }

    #[test]
    fn test_color_choice_carries_into_pin() {
        let mut placement = Placement::new();
        placement.click_image(ClickPoint { x: 400.0, y: 300.0 }, bounds());
        placement.set_comment("use brand color");
        placement.set_color(crate::models::PinColor::Blue);

        let pin = placement.confirm().unwrap();
        assert_eq!(pin.color, crate::models::PinColor::Blue);
    }
}
