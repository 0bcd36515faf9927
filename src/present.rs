// Presentation formatting. The engine returns raw numbers; rounding to two
// decimals happens only when a value is rendered.

pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${:.2}", value)
    }
}

pub fn format_tk(value: f64) -> String {
    format!("{:.2} Tk.", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(format_amount(11.360655737704918), "11.36");
        assert_eq!(format_usd(11.360655737704918), "$11.36");
        assert_eq!(format_usd(-0.5), "-$0.50");
        assert_eq!(format_tk(1300.0), "1300.00 Tk.");
    }
}
