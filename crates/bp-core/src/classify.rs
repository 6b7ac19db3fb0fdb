//! Per-reading classification rules.

use crate::models::{Category, Period};

/// Systolic reference lines drawn on trend charts (mmHg).
pub const SYSTOLIC_THRESHOLDS: [u16; 3] = [120, 130, 140];

/// Diastolic reference lines drawn on trend charts (mmHg).
pub const DIASTOLIC_THRESHOLDS: [u16; 3] = [80, 85, 90];

/// Categorise a reading from its systolic and diastolic pressures.
///
/// Branches are evaluated in order, so a reading that is both in the
/// elevated band and above a hypertensive bound (e.g. 145/85) is `Elevated`.
pub fn classify_bp(systolic: u16, diastolic: u16) -> Category {
    if systolic < 120 && diastolic < 80 {
        Category::Normal
    } else if (120..=140).contains(&systolic) || (80..=90).contains(&diastolic) {
        Category::Elevated
    } else if systolic > 140 || diastolic > 90 {
        Category::Hypertensive
    } else {
        Category::Unclassified
    }
}

/// Map an hour of day (0–23) to its period.
pub fn classify_period(hour: u32) -> Period {
    match hour {
        5..=11 => Period::Morning,
        12..=16 => Period::Afternoon,
        17..=21 => Period::Evening,
        _ => Period::Night,
    }
}
