//! Share link domain logic.
//!
//! Short identifier minting, expiration arithmetic, the reveal schedule for
//! read-only views, and the legacy self-contained payload codec.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Pin, PinColor, PinStatus, Pinshot, Project};
use crate::placement::PinPosition;

/// Length of the compact token embedded in share URLs.
pub const SHORT_ID_LEN: usize = 8;

/// Delay between consecutive pin reveals in the read-only view.
pub const REVEAL_STAGGER_MS: u64 = 300;

/// Mint a compact share token from fresh UUID material.
pub fn mint_short_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    raw[..SHORT_ID_LEN].to_string()
}

/// Compose the full shareable URL for a short id.
pub fn share_url(public_origin: &str, short_id: &str) -> String {
    format!("{}/view/{}", public_origin.trim_end_matches('/'), short_id)
}

/// Compute the expiration timestamp for a link created now.
///
/// `None` means the link never expires. Day counts below one are rejected;
/// the UI offers 1/7/30 but any positive count is accepted.
pub fn expiration_from_days(
    now: DateTime<Utc>,
    days: Option<i64>,
) -> Result<Option<String>, AppError> {
    match days {
        None => Ok(None),
        Some(days) if days >= 1 => Ok(Some((now + Duration::days(days)).to_rfc3339())),
        Some(days) => Err(AppError::Validation(format!(
            "Expiration must be at least one day, got {}",
            days
        ))),
    }
}

/// Reveal delay for the pin at the given position in the view order.
pub fn reveal_delay_ms(index: usize) -> u64 {
    index as u64 * REVEAL_STAGGER_MS
}

/// Number of pins revealed after `elapsed_ms` of viewing.
///
/// Pin `i` is revealed once elapsed time reaches `i * REVEAL_STAGGER_MS`, so
/// the revealed set grows monotonically and re-evaluating never shrinks it.
pub fn revealed_count(total: usize, elapsed_ms: u64) -> usize {
    if total == 0 {
        return 0;
    }
    ((elapsed_ms / REVEAL_STAGGER_MS) as usize + 1).min(total)
}

/// Flat project shape used by legacy self-contained links: a single inline
/// image with pins directly on the project.
#[derive(Debug, Deserialize)]
struct LegacyProject {
    id: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    pins: Vec<LegacyPin>,
}

#[derive(Debug, Deserialize)]
struct LegacyPin {
    id: String,
    x: f64,
    y: f64,
    comment: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

/// Decode a legacy base64 payload into a canonical project.
///
/// The flat shape is lifted into a project with exactly one pinshot. Malformed
/// base64 or JSON is a resolution failure; pins with out-of-range positions or
/// unknown status/color strings fall back field by field rather than failing
/// the whole payload.
pub fn decode_legacy_project(data: &str) -> Result<Project, AppError> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|_| AppError::NotFound("Invalid share payload".to_string()))?;
    let legacy: LegacyProject = serde_json::from_slice(&bytes)
        .map_err(|_| AppError::NotFound("Invalid share payload".to_string()))?;

    let pins = legacy
        .pins
        .into_iter()
        .filter_map(|pin| {
            let position = PinPosition::new(pin.x, pin.y)?;
            Some(Pin {
                id: pin.id,
                x: position.x(),
                y: position.y(),
                comment: pin.comment,
                status: pin
                    .status
                    .as_deref()
                    .and_then(PinStatus::from_str)
                    .unwrap_or_default(),
                color: pin
                    .color
                    .as_deref()
                    .and_then(PinColor::from_str)
                    .unwrap_or_default(),
            })
        })
        .collect();

    Ok(Project {
        id: legacy.id.clone(),
        name: legacy.name.clone(),
        pinshots: vec![Pinshot {
            id: legacy.id,
            name: legacy.name,
            image: legacy.image,
            pins,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_ids_are_compact_and_distinct() {
        let a = mint_short_id();
        let b = mint_short_id();
        assert_eq!(a.len(), SHORT_ID_LEN);
        assert_eq!(b.len(), SHORT_ID_LEN);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_share_url_composition() {
        assert_eq!(
            share_url("http://localhost:8080", "abcd1234"),
            "http://localhost:8080/view/abcd1234"
        );
        assert_eq!(
            share_url("https://pinshot.app/", "abcd1234"),
            "https://pinshot.app/view/abcd1234"
        );
    }

    #[test]
    fn test_expiration_days() {
        let now = Utc::now();
        assert_eq!(expiration_from_days(now, None).unwrap(), None);

        let in_seven = expiration_from_days(now, Some(7)).unwrap().unwrap();
        let parsed = DateTime::parse_from_rfc3339(&in_seven).unwrap();
        assert_eq!(parsed.signed_duration_since(now), Duration::days(7));

        assert!(expiration_from_days(now, Some(0)).is_err());
        assert!(expiration_from_days(now, Some(-3)).is_err());
    }

    #[test]
    fn test_reveal_schedule_is_monotonic() {
        assert_eq!(revealed_count(5, 0), 1);
        assert_eq!(revealed_count(5, 299), 1);
        assert_eq!(revealed_count(5, 300), 2);
        assert_eq!(revealed_count(5, 1199), 4);
        assert_eq!(revealed_count(5, 1200), 5);
        // Re-evaluating later never shrinks the set
        assert_eq!(revealed_count(5, 60_000), 5);
        assert_eq!(revealed_count(0, 1000), 0);
    }

    #[test]
    fn test_decode_legacy_payload() {
        let json = serde_json::json!({
            "id": "1714000000000",
            "name": "Bug Report",
            "image": "data:image/png;base64,AAAA",
            "pins": [
                { "id": "1", "x": 25.0, "y": 40.0, "comment": "button misaligned",
                  "status": "resolved", "color": "#52C41A" },
                { "id": "2", "x": 10.0, "y": 10.0, "comment": "no status" }
            ]
        });
        let payload = STANDARD.encode(serde_json::to_vec(&json).unwrap());

        let project = decode_legacy_project(&payload).unwrap();
        assert_eq!(project.name, "Bug Report");
        assert_eq!(project.pinshots.len(), 1);

        let pins = &project.pinshots[0].pins;
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].status, PinStatus::Resolved);
        assert_eq!(pins[0].color, PinColor::Green);
        assert_eq!(pins[1].status, PinStatus::Pending);
        assert_eq!(pins[1].color, PinColor::Red);
    }

    #[test]
    fn test_decode_drops_out_of_range_pins() {
        let json = serde_json::json!({
            "id": "1",
            "name": "P",
            "pins": [
                { "id": "1", "x": 150.0, "y": 40.0, "comment": "off canvas" },
                { "id": "2", "x": 50.0, "y": 50.0, "comment": "kept" }
            ]
        });
        let payload = STANDARD.encode(serde_json::to_vec(&json).unwrap());

        let project = decode_legacy_project(&payload).unwrap();
        assert_eq!(project.pinshots[0].pins.len(), 1);
        assert_eq!(project.pinshots[0].pins[0].comment, "kept");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_legacy_project("not base64 !!!").is_err());

        let not_json = STANDARD.encode(b"hello world");
        assert!(decode_legacy_project(&not_json).is_err());
    }
}
