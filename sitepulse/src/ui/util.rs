//! Small UI helpers: truncation and number formatting.

pub fn truncate_middle(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(len - right).collect();
    format!("{head}...{tail}")
}

/// Axis label: integers without a fraction, everything else to one place.
pub fn axis_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

/// Bar heights are integral; keep small non-zero values visible.
pub fn bar_value(v: f64) -> u64 {
    if v <= 0.0 || !v.is_finite() {
        0
    } else {
        v.round().max(1.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_truncation() {
        assert_eq!(truncate_middle("short", 10), "short");
        assert_eq!(truncate_middle("mysqld-worker-process", 10), "mys...cess");
        assert_eq!(truncate_middle("abcdef", 2), "...");
    }

    #[test]
    fn bars_and_labels() {
        assert_eq!(bar_value(0.0), 0);
        assert_eq!(bar_value(0.2), 1);
        assert_eq!(bar_value(41.6), 42);
        assert_eq!(axis_label(121.0), "121");
        assert_eq!(axis_label(12.34), "12.3");
    }
}
