//! Fuzzy lookup of disease phrases against the SNOMED CT vocabulary.

use strsim::normalized_levenshtein;

/// Similarity cutoff below which a phrase is considered unmatched.
const CUTOFF: f64 = 0.6;

/// Sentinel returned when no vocabulary entry clears the cutoff.
pub const UNKNOWN_CODE: &str = "0";

/// Canonical disease names and their SNOMED CT codes.
const DISEASE_CODES: [(&str, &str); 24] = [
    ("anemia", "271737000"),
    ("arthritis", "3723001"),
    ("asthma", "195967001"),
    ("cancer", "363346000"),
    ("chronic kidney disease", "709044004"),
    ("chronic obstructive pulmonary disease", "13645005"),
    ("covid-19", "840539006"),
    ("depression", "35489007"),
    ("diabetes", "73211009"),
    ("diabetes mellitus", "73211009"),
    ("epilepsy", "84757009"),
    ("heart failure", "84114007"),
    ("hepatitis", "128241005"),
    ("hypertension", "38341003"),
    ("hypothyroidism", "40930008"),
    ("influenza", "6142004"),
    ("malaria", "61462000"),
    ("migraine", "37796009"),
    ("obesity", "414916001"),
    ("osteoporosis", "64859006"),
    ("pneumonia", "233604007"),
    ("stroke", "230690007"),
    ("tuberculosis", "56717001"),
    ("urinary tract infection", "68566005"),
];

/// Resolve a free-text disease phrase to its SNOMED code.
///
/// Case-insensitive fuzzy match over the vocabulary; the best single
/// match at or above the cutoff wins, ties broken by vocabulary order.
/// Below the cutoff the sentinel [`UNKNOWN_CODE`] is returned — never an
/// error.
pub fn code_for(phrase: &str) -> &'static str {
    let needle = phrase.trim().to_lowercase();

    let mut best: Option<(f64, &'static str)> = None;
    for (name, code) in DISEASE_CODES {
        let score = normalized_levenshtein(&needle, name);
        if score >= CUTOFF && best.is_none_or(|(top, _)| score > top) {
            best = Some((score, code));
        }
    }

    best.map_or(UNKNOWN_CODE, |(_, code)| code)
}

/// Number of vocabulary entries (reported by the health endpoint).
pub fn vocabulary_len() -> usize {
    DISEASE_CODES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(code_for("diabetes"), "73211009");
        assert_eq!(code_for("asthma"), "195967001");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(code_for("Diabetes"), "73211009");
        assert_eq!(code_for("HYPERTENSION"), "38341003");
    }

    #[test]
    fn test_fuzzy_match_above_cutoff() {
        // "hypertensive" is two edits from "hypertension"
        assert_eq!(code_for("hypertensive"), "38341003");
        assert_eq!(code_for("diabets"), "73211009");
    }

    #[test]
    fn test_below_cutoff_returns_sentinel() {
        assert_eq!(code_for("carpal tunnel"), UNKNOWN_CODE);
        assert_eq!(code_for(""), UNKNOWN_CODE);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(code_for("pneumonia"), code_for("pneumonia"));
    }
}
