//! Blank-marker handling for masked sentences.

/// The literal token that marks a blank in sentence text.
pub const MASK_TOKEN: &str = "[MASK]";

/// Split sentence text on the blank marker.
///
/// Text with `k` markers always yields `k + 1` segments, some of which may be
/// empty (a sentence starting with a blank has an empty first segment).
pub fn split_segments(masked: &str) -> Vec<&str> {
    masked.split(MASK_TOKEN).collect()
}

/// Number of blank markers in `masked`, which is also its slot count.
pub fn blank_count(masked: &str) -> usize {
    masked.matches(MASK_TOKEN).count()
}
