/// Format a phone number for display.
/// Uzbek numbers (+998 and 9 digits) become `+998 XX XXX XX XX`.
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        12 if digits.starts_with("998") => format!(
            "+998 {} {} {} {}",
            &digits[3..5],
            &digits[5..8],
            &digits[8..10],
            &digits[10..12]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string as `dd.mm.yyyy`. Unparseable input comes back empty.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        return dt.format("%d.%m.%Y").to_string();
    }
    match date.get(..10).map(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d")) {
        Some(Ok(d)) => d.format("%d.%m.%Y").to_string(),
        _ => String::new(),
    }
}

/// Group digits in threes with spaces: `1234567` becomes `1 234 567`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Whole-unit amount with digit grouping and a currency suffix.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{} {}", sign, format_number(amount.abs().round() as u64), currency)
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
