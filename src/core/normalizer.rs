use serde_json::{Map, Value};

use crate::models::{AvailabilityStatus, Criteria, Position};

/// Turn the untyped extractor output into canonical Criteria.
///
/// This is the schema-validated ingestion boundary: unknown keys are
/// dropped silently, malformed values degrade to omitted fields, and a
/// contradictory height range drops both bounds. Never fails; the worst
/// case is an empty Criteria.
pub fn normalize(raw: &Map<String, Value>) -> Criteria {
    let mut criteria = Criteria {
        position: get_str(raw, "position").and_then(|s| Position::parse(&s)),
        nationality: get_str(raw, "nationality"),
        height_min: get_uint(raw, "heightMin", "height_min").and_then(to_u16),
        height_max: get_uint(raw, "heightMax", "height_max").and_then(to_u16),
        status: get_str(raw, "status").and_then(|s| AvailabilityStatus::parse(&s)),
        experience_min: get_uint(raw, "experienceMin", "experience_min").and_then(to_u8),
    };

    // Malformed range policy: prefer no constraint over a contradictory one.
    if let (Some(min), Some(max)) = (criteria.height_min, criteria.height_max) {
        if min > max {
            criteria.height_min = None;
            criteria.height_max = None;
        }
    }

    criteria
}

fn get_str(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a non-negative integer from a JSON number or a numeric string.
/// Negative, fractional, or non-numeric values are dropped.
fn get_uint(raw: &Map<String, Value>, key: &str, alias: &str) -> Option<u64> {
    let value = raw.get(key).or_else(|| raw.get(alias))?;
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn to_u16(n: u64) -> Option<u16> {
    u16::try_from(n).ok()
}

fn to_u8(n: u64) -> Option<u8> {
    u8::try_from(n).ok()
}
