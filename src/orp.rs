use unicode_segmentation::UnicodeSegmentation;

/// Core length bands and the fixation offset each one maps to.
/// Anything longer than the last band uses `LONG_WORD_OFFSET`.
const ORP_BANDS: [(usize, usize); 4] = [(1, 0), (5, 1), (9, 2), (13, 3)];
const LONG_WORD_OFFSET: usize = 4;

fn is_alphanumeric(grapheme: &str) -> bool {
    grapheme.chars().any(char::is_alphanumeric)
}

fn band_offset(core_len: usize) -> usize {
    ORP_BANDS
        .iter()
        .find(|(max_len, _)| core_len <= *max_len)
        .map_or(LONG_WORD_OFFSET, |(_, offset)| *offset)
}

/// Compute the optimal recognition point for a token.
///
/// The word length is measured on the token's core (first to last letter or
/// digit), so surrounding punctuation does not push the fixation point.
/// Leading punctuation still shifts the returned index, which always points
/// into the whole token. Tokens with no letters or digits fall back to their
/// midpoint.
///
/// The index counts grapheme clusters, not bytes.
pub fn compute_orp_index(token: &str) -> usize {
    let graphemes: Vec<&str> = token.graphemes(true).collect();

    let core_start = graphemes.iter().position(|g| is_alphanumeric(g));
    let core_end = graphemes.iter().rposition(|g| is_alphanumeric(g));

    match (core_start, core_end) {
        (Some(start), Some(end)) => start + band_offset(end - start + 1),
        _ => graphemes.len() / 2,
    }
}
