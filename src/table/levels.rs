//! Tolerance clustering of physical edge positions into boundary levels.

/// Merges sorted edge positions into strictly increasing boundary levels.
///
/// A value joins the current run while it lies within `tolerance` of the previous
/// value, so chains of close values collapse into one level. The first value of
/// every run becomes the level.
pub fn cluster(values: &[i64], tolerance: u32) -> Vec<i64> {
    let tolerance = i64::from(tolerance);
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mut levels: Vec<i64> = Vec::new();
    let mut previous: Option<i64> = None;
    for value in sorted {
        match previous {
            Some(last) if value - last <= tolerance => (),
            _ => levels.push(value),
        }
        previous = Some(value);
    }
    levels
}

/// Returns the index of the level nearest to `value`; ties go to the lower index.
/// Returns None for an empty level list.
pub fn nearest_level(levels: &[i64], value: i64) -> Option<usize> {
    if levels.is_empty() {
        return None;
    }
    let upper = levels.partition_point(|level| *level < value);
    if upper == 0 {
        Some(0)
    } else if upper == levels.len() {
        Some(levels.len() - 1)
    } else {
        let below = value - levels[upper - 1];
        let above = levels[upper] - value;
        Some(if below <= above { upper - 1 } else { upper })
    }
}
