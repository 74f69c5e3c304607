//! Tagged text spans produced by the upstream extractors.

use serde::{Deserialize, Serialize};

/// A labeled span of the source query.
///
/// Offsets are positions into the original query string with
/// `start < end`. Entity lists handed to the resolver may be unsorted,
/// overlapping, or duplicated; the engine tolerates all of that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: EntityLabel, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label,
            start,
            end,
        }
    }
}

/// Closed set of entity tags the resolver understands.
///
/// Upstream models emit free-form tag strings; `from_tag` maps them onto
/// this enum so resolution dispatches exhaustively, with `Unknown` as the
/// no-op arm for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    /// Person-name span from a general-purpose tagger
    Person,
    /// Geopolitical entity (city, state, country)
    Gpe,
    /// Non-GPE location
    Loc,
    /// Facility (building, airport, hospital)
    Fac,
    /// Free-form date phrase
    Date,
    Identifier,
    Phone,
    Email,
    Organization,
    GivenNameTrigger,
    FamilyNameTrigger,
    NameGeneral,
    GpTrigger,
    DeathKeyword,
    BirthKeyword,
    YearRange,
    YearAfter,
    YearBefore,
    OnYear,
    AgeOver,
    AgeUnder,
    AgeExact,
    Age,
    GenderMale,
    GenderFemale,
    GenderOther,
    /// Leading span of a disease mention (wire tag `LABEL_1`)
    ConditionHead,
    /// Continuation span of a disease mention (wire tag `LABEL_2`)
    ConditionTail,
    /// Unrecognized tag; ignored by resolution
    Unknown,
}

impl EntityLabel {
    /// Map a wire tag string onto the closed label set.
    ///
    /// Accepts the rule-pattern tag names, spaCy-style tags (`PERSON`,
    /// `GPE`, ...), general NER group tags (`PER`, `LOC`, `ORG`), and the
    /// disease model's `LABEL_*` groups. `LABEL_0` is the model's
    /// "no entity" tag and maps to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => Self::Person,
            "GPE" => Self::Gpe,
            "LOC" => Self::Loc,
            "FAC" => Self::Fac,
            "DATE" => Self::Date,
            "IDENTIFIER" => Self::Identifier,
            "PHONE" => Self::Phone,
            "EMAIL" => Self::Email,
            "ORG" | "ORGANIZATION" => Self::Organization,
            "GIVEN_NAME_TRIGGER" => Self::GivenNameTrigger,
            "FAMILY_NAME_TRIGGER" => Self::FamilyNameTrigger,
            "NAME_GENERAL" => Self::NameGeneral,
            "GP_TRIGGER" => Self::GpTrigger,
            "DEATH_KEYWORD" => Self::DeathKeyword,
            "BIRTH_KEYWORD" => Self::BirthKeyword,
            "YEAR_RANGE" => Self::YearRange,
            "YEAR_AFTER" => Self::YearAfter,
            "YEAR_BEFORE" => Self::YearBefore,
            "ON_YEAR" => Self::OnYear,
            "AGE_OVER" => Self::AgeOver,
            "AGE_UNDER" => Self::AgeUnder,
            "AGE_EXACT" => Self::AgeExact,
            "AGE" => Self::Age,
            "GENDER_MALE" => Self::GenderMale,
            "GENDER_FEMALE" => Self::GenderFemale,
            "GENDER_OTHER" => Self::GenderOther,
            "LABEL_1" | "CONDITION_HEAD" => Self::ConditionHead,
            "LABEL_2" | "CONDITION_TAIL" => Self::ConditionTail,
            _ => Self::Unknown,
        }
    }

    /// Date-like labels the birth/death normalizer scans for.
    pub fn is_date_like(self) -> bool {
        matches!(
            self,
            Self::Date | Self::OnYear | Self::YearRange | Self::YearAfter | Self::YearBefore
        )
    }

    /// Age-expression labels.
    pub fn is_age_like(self) -> bool {
        matches!(
            self,
            Self::AgeOver | Self::AgeUnder | Self::AgeExact | Self::Age
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_wire_aliases() {
        assert_eq!(EntityLabel::from_tag("PERSON"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("LABEL_1"), EntityLabel::ConditionHead);
        assert_eq!(EntityLabel::from_tag("LABEL_2"), EntityLabel::ConditionTail);
        assert_eq!(EntityLabel::from_tag("LABEL_0"), EntityLabel::Unknown);
        assert_eq!(EntityLabel::from_tag("label_1"), EntityLabel::ConditionHead);
        assert_eq!(EntityLabel::from_tag("MISC"), EntityLabel::Unknown);
    }

    #[test]
    fn test_label_classes() {
        assert!(EntityLabel::YearAfter.is_date_like());
        assert!(EntityLabel::Date.is_date_like());
        assert!(!EntityLabel::AgeOver.is_date_like());
        assert!(EntityLabel::AgeOver.is_age_like());
        assert!(!EntityLabel::Person.is_age_like());
    }
}
