use super::TimeSlot;

/// Returns true when adding `candidate` next to `existing` would put two
/// overlapping meetings on the same day.
///
/// Overlap is open-interval: `[09:00, 10:00)` and `[10:00, 11:00)` touch but do
/// not conflict.
pub fn would_conflict(existing: &[TimeSlot], candidate: &[TimeSlot]) -> bool {
    find_conflict(existing, candidate).is_some()
}

/// First `(existing, candidate)` pair that overlaps, if any.
pub fn find_conflict<'a>(
    existing: &'a [TimeSlot],
    candidate: &'a [TimeSlot],
) -> Option<(&'a TimeSlot, &'a TimeSlot)> {
    existing
        .iter()
        .flat_map(|e| candidate.iter().map(move |c| (e, c)))
        .find(|(e, c)| e.overlaps(c))
}
