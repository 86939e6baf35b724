const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

fn with_remainder(head: String, rest: u64) -> String {
    if rest == 0 {
        head
    } else {
        format!("{head} {}", in_words(rest))
    }
}

/// Words for `n > 0` on the Indian scale
fn in_words(n: u64) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => with_remainder(TENS[(n / 10) as usize].to_string(), n % 10),
        100..=999 => with_remainder(format!("{} Hundred", ONES[(n / 100) as usize]), n % 100),
        1_000..=99_999 => with_remainder(format!("{} Thousand", in_words(n / THOUSAND)), n % THOUSAND),
        100_000..=9_999_999 => with_remainder(format!("{} Lakh", in_words(n / LAKH)), n % LAKH),
        _ => with_remainder(format!("{} Crore", in_words(n / CRORE)), n % CRORE),
    }
}

/// Amount in words for a payslip, e.g. `One Lakh Rupees Only /-`
pub fn to_words(amount: u64) -> String {
    let words = if amount == 0 {
        "Zero".to_string()
    } else {
        in_words(amount)
    };
    format!("{words} Rupees Only /-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_small_numbers() {
        assert_eq!(to_words(0), "Zero Rupees Only /-");
        assert_eq!(to_words(7), "Seven Rupees Only /-");
        assert_eq!(to_words(19), "Nineteen Rupees Only /-");
        assert_eq!(to_words(40), "Forty Rupees Only /-");
        assert_eq!(to_words(99), "Ninety Nine Rupees Only /-");
        assert_eq!(to_words(305), "Three Hundred Five Rupees Only /-");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(to_words(100_000), "One Lakh Rupees Only /-");
        assert_eq!(
            to_words(1_234_567),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Only /-"
        );
        assert_eq!(to_words(45_000), "Forty Five Thousand Rupees Only /-");
        assert_eq!(
            to_words(99_99_999),
            "Ninety Nine Lakh Ninety Nine Thousand Nine Hundred Ninety Nine Rupees Only /-"
        );
    }

    #[test]
    fn crores_recurse() {
        assert_eq!(to_words(10_000_000), "One Crore Rupees Only /-");
        assert_eq!(
            to_words(1_05_00_010),
            "One Crore Five Lakh Ten Rupees Only /-"
        );
        assert_eq!(
            to_words(250_00_00_000),
            "Two Hundred Fifty Crore Rupees Only /-"
        );
    }
}
