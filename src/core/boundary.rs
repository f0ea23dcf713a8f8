use crate::domain::model::START_OF_SPRING_NAMES;
use std::collections::BTreeSet;

/// Whether Start-of-Spring has already occurred in the current Gregorian year.
///
/// The term is assumed to fall on February 3-5. On the 4th and 5th the
/// provider's active terms decide, with the 5th counting as passed even when
/// the provider reports nothing. January is never past the boundary and March
/// onward always is.
pub fn is_boundary_passed(month: u32, day: u32, active_terms: &BTreeSet<String>) -> bool {
    match (month, day) {
        (1, _) => false,
        (2, d) if d < 4 => false,
        (2, d) if d > 5 => true,
        (2, d) => has_start_of_spring(active_terms) || d == 5,
        _ => true,
    }
}

fn has_start_of_spring(active_terms: &BTreeSet<String>) -> bool {
    START_OF_SPRING_NAMES
        .iter()
        .any(|name| active_terms.contains(*name))
}
