//! Scalable-role sizing

use crate::models::{DeploymentMode, ScaleCount};

/// Seats one scalable instance serves in the fully hosted cloud
pub const HOSTED_CAPACITY: u32 = 30;

/// Seats one scalable instance serves in every other mode
pub const DEFAULT_CAPACITY: u32 = 25;

/// Seats one scalable instance serves in the given mode
pub fn capacity(mode: DeploymentMode) -> u32 {
    match mode {
        DeploymentMode::HostedCloud => HOSTED_CAPACITY,
        _ => DEFAULT_CAPACITY,
    }
}

/// Number of scalable instances required and recommended for a license count.
///
/// At or below a third of the capacity no instance is required but one is
/// recommended. Above it, each full capacity block requires one instance and
/// a remainder strictly larger than the threshold recommends one more.
pub fn calculate_scale(total_licenses: u32, mode: DeploymentMode) -> ScaleCount {
    let capacity = capacity(mode);
    let threshold = capacity / 3;

    if total_licenses == 0 {
        return ScaleCount::default();
    }

    if total_licenses <= threshold {
        return ScaleCount {
            required: 0,
            recommended: 1,
        };
    }

    let required = total_licenses / capacity;
    let remainder = total_licenses % capacity;
    let recommended = required + u32::from(remainder > threshold);

    ScaleCount {
        required,
        recommended,
    }
}
