//! Display formatting for statistics

/// Fixed-point formatting with `decimals` places
#[must_use]
pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// p-value formatting: `<0.001`, three decimals below 0.01, otherwise two
#[must_use]
pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "<0.001".to_string()
    } else if p < 0.01 {
        format_number(p, 3)
    } else {
        format_number(p, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(-6.02, 2), "-6.02");
        assert_eq!(format_number(1.0 / 3.0, 4), "0.3333");
    }

    #[test]
    fn test_format_p_value_bands() {
        assert_eq!(format_p_value(0.0004), "<0.001");
        assert_eq!(format_p_value(0.0042), "0.004");
        assert_eq!(format_p_value(0.2345), "0.23");
    }
}
