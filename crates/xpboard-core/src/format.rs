//! Display formatting for numbers, sizes and dates

use chrono::{DateTime, Utc};

/// Thousands-separated integer ("12,345")
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Chart value: grouped integer part, at most 3 fraction digits
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        return format_number(rounded as i64);
    }
    let fraction = format!("{:.3}", rounded.abs().fract());
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, format_number(rounded.abs().trunc() as i64), fraction)
}

/// Canonical XP display: raw count with separators
pub fn format_xp(xp: i64) -> String {
    format!("{} XP", format_number(xp))
}

/// Audit volume in decimal kB below one megabyte, MB with 2 decimals above
pub fn format_bytes(bytes: i64) -> String {
    if bytes == 0 {
        return "0 kB".to_string();
    }
    if bytes < 1_000_000 {
        let kb = (bytes as f64 / 1000.0).round() as i64;
        format!("{} kB", format_number(kb))
    } else {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    }
}

/// "Mar 1, 2024"
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Coarse relative time ("3 days ago", "Just now")
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const INTERVALS: [(&str, i64); 5] = [
        ("year", 31_536_000),
        ("month", 2_592_000),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
    ];

    let elapsed = (now - date).num_seconds();
    for (label, seconds) in INTERVALS {
        let count = elapsed / seconds;
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{} {}{} ago", count, label, plural);
        }
    }
    "Just now".to_string()
}

/// Up to two uppercase initials ("Jane Doe" -> "JD")
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Cut a label to `max` characters, appending "..." when shortened
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let kept: String = label.chars().take(max).collect();
        format!("{}...", kept)
    } else {
        label.to_string()
    }
}
