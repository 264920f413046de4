//! pt-BR number formatting for cards, tables and IRPF text.

/// Shown where a figure is undefined (e.g. weighted IRR of an empty portfolio).
pub const NOT_AVAILABLE: &str = "N/D";

/// `1234.5` → `"1.234,50"`. Rounded to cents.
pub fn format_brl_plain(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped},{frac:02}")
}

/// `1234.5` → `"R$ 1.234,50"`, `-3.0` → `"-R$ 3,00"`.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let plain = format_brl_plain(value);
    match plain.strip_prefix('-') {
        Some(abs) => format!("-R$ {abs}"),
        None => format!("R$ {plain}"),
    }
}

/// `6.25` → `"6.25%"`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{value:.2}%")
}

/// Weighted rate card: `None` renders as [`NOT_AVAILABLE`].
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map(format_percentage)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Allocation pie label, one decimal: `"PETR4 (25.0%)"`.
pub fn format_allocation_label(ticker: &str, percentage: f64) -> String {
    format!("{ticker} ({percentage:.1}%)")
}

/// Value pasted into the IRPF program: dot decimal, two places, no grouping.
pub fn copy_value(value: f64) -> String {
    format!("{value:.2}")
}
