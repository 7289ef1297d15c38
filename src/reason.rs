//! Human-readable threat reasons and mitigations, shared by the graph-based
//! A* path (spec.md §4.3) and polyline route analysis (spec.md §4.4). Built
//! from the fixed phrase bank the spec describes.

const WATERFRONT_LNG: f64 = -74.005;
const INDUSTRIAL_LNG: f64 = -73.94;

pub fn is_night_hour(hour: u32) -> bool {
    matches!(hour, 22 | 23 | 0..=5)
}

/// `reason` for a threat segment. `is_night` should be `false` whenever no
/// timestamp is available to the caller (the graph-based path has no clock
/// to read after build time).
pub fn reason(uti_score: f64, lng: f64, is_night: bool) -> String {
    let mut parts = Vec::new();

    if uti_score > 0.7 {
        parts.push("High crime prediction area");
    } else if uti_score > 0.5 {
        parts.push("Moderate risk area");
    }

    if lng < WATERFRONT_LNG {
        parts.push("Waterfront area with limited visibility");
    } else if lng > INDUSTRIAL_LNG {
        parts.push("Industrial area with reduced foot traffic");
    }

    if is_night {
        parts.push("Late night/early morning hours");
    }

    if parts.is_empty() {
        "Elevated risk area".to_string()
    } else {
        parts.join("; ")
    }
}

pub fn mitigation(uti_score: f64, lng: f64, is_night: bool) -> String {
    let mut parts = Vec::new();

    if uti_score > 0.7 {
        parts.push("Consider alternative route");
        parts.push("Travel with others");
    } else if uti_score > 0.5 {
        parts.push("Stay alert");
        parts.push("Avoid distractions");
    }

    if lng < WATERFRONT_LNG || lng > INDUSTRIAL_LNG {
        parts.push("Use well-lit main roads");
    }

    if is_night {
        parts.push("Consider daytime travel");
    }

    if parts.is_empty() {
        "Exercise normal caution".to_string()
    } else {
        parts.join("; ")
    }
}
