//! Small text helpers shared by the graph builder and the report renderer.

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Integer share of `part` in `whole`, as a rounded percentage.
///
/// Returns `0` when `whole` is zero.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::share_percent;
///
/// assert_eq!(share_percent(1, 3), 33);
/// assert_eq!(share_percent(2, 3), 67);
/// assert_eq!(share_percent(5, 0), 0);
/// ```
pub fn share_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Shorten `label` to `keep` characters plus `"..."` when it is longer than
/// `max_chars`. Counts characters, not bytes.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::truncate_label;
///
/// assert_eq!(truncate_label("short.com", 40, 37), "short.com");
/// assert_eq!(truncate_label("abcdefghij", 8, 5), "abcde...");
/// ```
pub fn truncate_label(label: &str, max_chars: usize, keep: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Render a horizontal bar of `width` cells filled to `percent` (0–100).
///
/// A non-zero percentage always shows at least one cell.
pub fn format_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let mut filled = ((clamped / 100.0) * width as f64).round() as usize;
    if clamped > 0.0 && filled == 0 {
        filled = 1;
    }
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
