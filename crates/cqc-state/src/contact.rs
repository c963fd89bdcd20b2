/// Outcome of validating a contact candidate (spec §4.9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPhone(String);

impl ValidatedPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Strip whitespace and the separators `()-.`, then require
/// `^\+?\d{10,15}$`, rejecting degenerate sequences (≤2 unique digits, or an
/// obvious monotonic run). Normalises to `+<digits>` on success.
pub fn validate_phone(raw: &str) -> Option<ValidatedPhone> {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '-' | '.'))
        .collect();

    let (has_plus, digits) = match stripped.strip_prefix('+') {
        Some(rest) => (true, rest.to_string()),
        None => (false, stripped.clone()),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(10..=15).contains(&digits.len()) {
        return None;
    }
    if is_degenerate(&digits) {
        return None;
    }

    let _ = has_plus;
    Some(ValidatedPhone(format!("+{digits}")))
}

fn is_degenerate(digits: &str) -> bool {
    let unique: std::collections::HashSet<char> = digits.chars().collect();
    if unique.len() <= 2 {
        return true;
    }
    is_monotonic_run(digits)
}

fn is_monotonic_run(digits: &str) -> bool {
    let values: Vec<i32> = digits.chars().filter_map(|c| c.to_digit(10)).map(|d| d as i32).collect();
    if values.len() < 2 {
        return false;
    }
    let ascending = values.windows(2).all(|w| w[1] - w[0] == 1);
    let descending = values.windows(2).all(|w| w[0] - w[1] == 1);
    ascending || descending
}

/// Parse a free-text `"Name - Phone"` line, or just a bare phone (spec §4.9).
pub fn parse_contact_line(text: &str) -> Option<(Option<String>, ValidatedPhone)> {
    if let Some((name, phone)) = text.split_once('-') {
        if let Some(validated) = validate_phone(phone) {
            let name = name.trim();
            let name = if name.is_empty() { None } else { Some(name.to_string()) };
            return Some((name, validated));
        }
    }
    validate_phone(text).map(|phone| (None, phone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_e164() {
        assert_eq!(validate_phone("+971501234567").unwrap().as_str(), "+971501234567");
    }

    #[test]
    fn strips_separators() {
        assert_eq!(validate_phone("(971) 50-123.4567").unwrap().as_str(), "+971501234567");
    }

    #[test]
    fn rejects_monotonic_run() {
        assert!(validate_phone("0123456789").is_none());
    }

    #[test]
    fn rejects_two_unique_digits() {
        assert!(validate_phone("1212121212").is_none());
    }

    #[test]
    fn rejects_too_short() {
        assert!(validate_phone("12345").is_none());
    }

    #[test]
    fn parses_name_phone_line() {
        let (name, phone) = parse_contact_line("Ali - +971501234567").unwrap();
        assert_eq!(name.as_deref(), Some("Ali"));
        assert_eq!(phone.as_str(), "+971501234567");
    }

    #[test]
    fn normalising_twice_is_idempotent() {
        let first = validate_phone("+971501234567").unwrap();
        let second = validate_phone(first.as_str()).unwrap();
        assert_eq!(first, second);
    }
}
