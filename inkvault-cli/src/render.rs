//! Terminal rendering of search hits.

/// Wraps each run of highlighted characters in `[` `]`.
pub fn mark_highlights(value: &str, positions: &[usize]) -> String {
    let mut out = String::with_capacity(value.len() + positions.len() * 2);
    let mut inside = false;
    for (i, c) in value.chars().enumerate() {
        let hit = positions.binary_search(&i).is_ok();
        if hit && !inside {
            out.push('[');
        } else if !hit && inside {
            out.push(']');
        }
        inside = hit;
        out.push(c);
    }
    if inside {
        out.push(']');
    }
    out
}
