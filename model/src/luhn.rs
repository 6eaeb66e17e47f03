//! Canonical Luhn check-digit validation for order and withdrawal numbers.

/// Returns true if `number` is a non-empty string of ASCII digits that satisfies the Luhn
/// checksum.
///
/// Doubling starts at index 0 when the number has an even length, index 1 otherwise, so the
/// rightmost digit is always left undoubled. A doubled digit that reaches 10 or more has 9
/// subtracted from it (equivalent to summing its own digits) rather than being reduced modulo 9,
/// which would incorrectly map a doubled 9 (18) to 0 instead of 9.
pub fn valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }
    let mut digits = Vec::with_capacity(number.len());
    for c in number.chars() {
        match c.to_digit(10) {
            Some(d) => digits.push(d),
            None => return false,
        }
    }
    let start = if digits.len() % 2 == 0 { 0 } else { 1 };
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i >= start && (i - start) % 2 == 0 {
                let doubled = d * 2;
                if doubled >= 10 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_valid_numbers() {
        assert!(valid("12345678903"));
        assert!(valid("2377225624"));
        assert!(valid("4561261212345467"));
        assert!(valid("79927398713"));
    }

    #[test]
    fn rejects_known_invalid_numbers() {
        assert!(!valid("1"));
        assert!(!valid("79927398710"));
    }

    #[test]
    fn rejects_non_digit_input() {
        assert!(!valid(""));
        assert!(!valid("12a45"));
        assert!(!valid("-12345"));
    }

    /// "91" is valid under the canonical algorithm (doubled 9 -> 18 -> 9), but the source's
    /// `(2*v) mod 9` shortcut maps the doubled 9 to 0 instead and would wrongly reject it.
    /// "90" is the mirror case: canonically invalid, but the shortcut's miscounted 0 makes its
    /// checksum come out even, wrongly accepting it.
    #[test]
    fn pins_canonical_semantics_over_mod_nine_shortcut() {
        assert!(valid("91"));
        assert!(!valid("90"));
    }
}
