//! Currency display helpers

/// Whole-unit Korean won with thousands grouping, e.g. `₩1,234,567`
pub fn format_won(amount: u128) -> String {
    format!("₩{}", group_thousands(&amount.to_string()))
}

/// Signed variant used for the net balance
pub fn format_won_signed(amount: i128) -> String {
    let grouped = group_thousands(&amount.unsigned_abs().to_string());
    if amount < 0 {
        format!("-₩{}", grouped)
    } else {
        format!("₩{}", grouped)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_won() {
        assert_eq!(format_won(0), "₩0");
        assert_eq!(format_won(999), "₩999");
        assert_eq!(format_won(1000), "₩1,000");
        assert_eq!(format_won(59000), "₩59,000");
        assert_eq!(format_won(3_200_000), "₩3,200,000");
    }

    #[test]
    fn test_format_won_beyond_u64() {
        assert_eq!(
            format_won(2 * u128::from(u64::MAX)),
            "₩36,893,488,147,419,103,230"
        );
    }

    #[test]
    fn test_format_won_signed() {
        assert_eq!(format_won_signed(-158_500), "-₩158,500");
        assert_eq!(format_won_signed(42), "₩42");
    }
}
