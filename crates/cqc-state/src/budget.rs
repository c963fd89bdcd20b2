use cqc_store::types::TransactionType;

/// A budget band: `index` is the canonical button payload suffix
/// (`budget_0`..`budget_4`), `(min, max)` in AED, `max = None` means
/// "and above" (spec §4.1 "Budget ranges are a single source of truth").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetBand {
    pub index: u8,
    pub min: i64,
    pub max: Option<i64>,
}

const BUY_BANDS: [BudgetBand; 5] = [
    BudgetBand { index: 0, min: 0, max: Some(150_000) },
    BudgetBand { index: 1, min: 150_000, max: Some(300_000) },
    BudgetBand { index: 2, min: 300_000, max: Some(500_000) },
    BudgetBand { index: 3, min: 500_000, max: Some(750_000) },
    BudgetBand { index: 4, min: 750_000, max: None },
];

const RENT_BANDS: [BudgetBand; 5] = [
    BudgetBand { index: 0, min: 0, max: Some(50_000) },
    BudgetBand { index: 1, min: 50_000, max: Some(100_000) },
    BudgetBand { index: 2, min: 100_000, max: Some(200_000) },
    BudgetBand { index: 3, min: 200_000, max: Some(500_000) },
    BudgetBand { index: 4, min: 500_000, max: None },
];

pub fn bands_for(transaction_type: TransactionType) -> &'static [BudgetBand; 5] {
    match transaction_type {
        TransactionType::Buy => &BUY_BANDS,
        TransactionType::Rent => &RENT_BANDS,
    }
}

/// Look up a band by its button-payload index (`budget_0`..`budget_4`).
/// This is the left inverse asserted in spec §8: for each canonical label,
/// `band_by_index` returns the corresponding band.
pub fn band_by_index(transaction_type: TransactionType, index: u8) -> Option<BudgetBand> {
    bands_for(transaction_type).iter().find(|b| b.index == index).copied()
}

/// Deterministic free-text amount parser (spec §4.1 step 1): `"2M"` → 2 000 000,
/// `"دو میلیون"` → 2 000 000, plus plain digit strings and `k`/`m` suffixes.
/// Returns `None` when nothing recognisable is present.
pub fn parse_amount(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Some(amount) = parse_persian_words(trimmed) {
        return Some(amount);
    }
    parse_numeric_with_suffix(trimmed)
}

fn parse_numeric_with_suffix(text: &str) -> Option<i64> {
    let lower = text.to_lowercase();
    let lower = lower.replace([',', ' '], "");
    let (digits, multiplier) = if let Some(stripped) = lower.strip_suffix('m') {
        (stripped, 1_000_000i64)
    } else if let Some(stripped) = lower.strip_suffix('k') {
        (stripped, 1_000i64)
    } else {
        (lower.as_str(), 1i64)
    };
    let numeric: String = digits.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if numeric.is_empty() {
        return None;
    }
    let value: f64 = numeric.parse().ok()?;
    Some((value * multiplier as f64).round() as i64)
}

/// Handles the Farsi "X million" idiom that a regex on digits alone misses.
fn parse_persian_words(text: &str) -> Option<i64> {
    const MILLION_WORDS: [&str; 2] = ["میلیون", "million"];
    let lower = text.to_lowercase();
    if !MILLION_WORDS.iter().any(|w| lower.contains(w)) {
        return None;
    }
    const PERSIAN_NUMBERS: [(&str, i64); 10] = [
        ("یک", 1), ("دو", 2), ("سه", 3), ("چهار", 4), ("پنج", 5),
        ("شش", 6), ("هفت", 7), ("هشت", 8), ("نه", 9), ("ده", 10),
    ];
    for (word, value) in PERSIAN_NUMBERS {
        if lower.contains(word) {
            return Some(value * 1_000_000);
        }
    }
    // "2 میلیون" style: a leading digit plus the word.
    let digits: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().ok().map(|n| n * 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_m_suffix() {
        assert_eq!(parse_amount("2M"), Some(2_000_000));
    }

    #[test]
    fn parses_k_suffix() {
        assert_eq!(parse_amount("450k"), Some(450_000));
    }

    #[test]
    fn parses_farsi_million_word() {
        assert_eq!(parse_amount("دو میلیون"), Some(2_000_000));
    }

    #[test]
    fn unrecognisable_text_is_none() {
        assert_eq!(parse_amount("not a number"), None);
    }

    #[test]
    fn band_lookup_is_a_left_inverse_of_the_canonical_index() {
        for i in 0..5u8 {
            let band = band_by_index(TransactionType::Buy, i).unwrap();
            assert_eq!(band.index, i);
        }
    }
}
