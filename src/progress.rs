/// Percentage of the way through a sequence of `total` items when showing
/// the item at `index`.
///
/// The first item is 0% and the last is 100%. A single-item sequence is
/// complete as soon as it is shown; an empty one reports 0%.
pub fn progress_percent(index: usize, total: usize) -> f64 {
    match total {
        0 => 0.0,
        1 => 100.0,
        _ => (index.min(total - 1) as f64 / (total - 1) as f64) * 100.0,
    }
}

/// Index under a pointer at `ratio` (0.0 = start, 1.0 = end) of the bar.
pub fn index_for_ratio(ratio: f64, total: usize) -> usize {
    if total == 0 || !ratio.is_finite() {
        return 0;
    }
    (ratio.clamp(0.0, 1.0) * (total - 1) as f64).round() as usize
}

/// Header label: one-based position over the total.
pub fn position_label(index: usize, total: usize) -> String {
    if total == 0 {
        return "0 / 0".to_string();
    }
    format!("{} / {}", index.min(total - 1) + 1, total)
}
