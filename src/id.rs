//! Record identifier utilities for Flock
//!
//! Member and attendance ids are small positive integers assigned by the
//! owning store. Callers frequently hold ids as text (route segments, CLI
//! arguments), so parsing is lenient in the same way the directory UI was.

/// Identifier of a member or attendance record
pub type RecordId = u32;

/// Parse the integer form of a textual id
///
/// Leading/trailing whitespace is ignored, an optional `+` sign is accepted,
/// and parsing stops at the first non-digit: `"12abc"` yields `Some(12)`.
/// Returns `None` when no leading digits are present or the value overflows.
pub fn parse_id(text: &str) -> Option<RecordId> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// Compute the next id for a collection
///
/// One greater than the largest existing id, or 1 for an empty collection.
/// `high_water` is the largest id ever issued, so deleting the newest record
/// never frees its id for reuse. Returns `None` once the id space is used up.
pub fn next_id<I>(existing: I, high_water: RecordId) -> Option<RecordId>
where
    I: IntoIterator<Item = RecordId>,
{
    let max_existing = existing.into_iter().max().unwrap_or(0);
    max_existing.max(high_water).checked_add(1)
}
