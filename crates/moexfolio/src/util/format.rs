/// Format a fraction as a percentage (`0.1234` -> `12.34%`)
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.2}%", value * 100.0)
}

/// Format a Sharpe ratio; zero-risk portfolios have none
pub fn format_sharpe(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "n/a".to_string()
    }
}

/// Format a correlation coefficient with four decimals
pub fn format_correlation(value: f64) -> String {
    if value.is_finite() {
        format!("{:.4}", value)
    } else {
        "n/a".to_string()
    }
}
