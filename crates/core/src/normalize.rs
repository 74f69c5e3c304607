//! Date and age normalization into FHIR search values.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::entity::{Entity, EntityLabel};

/// Recognized exact-date shapes, tried in order: a chrono format paired
/// with the regex that gates it.
const DATE_FORMATS: [(&str, &str); 8] = [
    ("%Y-%m-%d", r"\b\d{4}-\d{1,2}-\d{1,2}\b"),
    ("%Y/%m/%d", r"\b\d{4}/\d{1,2}/\d{1,2}\b"),
    ("%d-%m-%Y", r"\b\d{1,2}-\d{1,2}-\d{4}\b"),
    ("%d/%m/%Y", r"\b\d{1,2}/\d{1,2}/\d{4}\b"),
    ("%B %d, %Y", r"\b[A-Za-z]+ \d{1,2}, \d{4}\b"),
    ("%b %d, %Y", r"\b[A-Za-z]{3} \d{1,2}, \d{4}\b"),
    ("%d %B %Y", r"\b\d{1,2} [A-Za-z]+ \d{4}\b"),
    ("%d %b %Y", r"\b\d{1,2} [A-Za-z]{3} \d{4}\b"),
];

static DATE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DATE_FORMATS
        .iter()
        .map(|(fmt, pattern)| (*fmt, Regex::new(pattern).expect("static date pattern")))
        .collect()
});

static YEAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("static year pattern"));

static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("static year pattern"));

static AGE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}").expect("static age pattern"));

/// Convert a date-like entity to a FHIR search value.
///
/// Priority: year-range (`ge<y1>,le<y2>`), on-year (bare year),
/// after-year (`gt<year>-12-31`), before-year (`lt<year>-01-01`), the
/// exact-date shapes normalized to `YYYY-MM-DD`, then any bare 4-digit
/// year in [1900, 2100]. Anything else is absent, not an error.
pub fn normalize_date(entity: &Entity) -> Option<String> {
    let text = entity.text.as_str();

    match entity.label {
        EntityLabel::YearRange => {
            let years: Vec<&str> = YEAR_RUN.find_iter(text).map(|m| m.as_str()).collect();
            if years.len() >= 2 {
                return Some(format!("ge{},le{}", years[0], years[1]));
            }
        }
        EntityLabel::OnYear => {
            if let Some(year) = first_year_token(text) {
                return Some(year.to_string());
            }
        }
        EntityLabel::YearAfter => {
            if let Some(year) = first_year_token(text) {
                return Some(format!("gt{year}-12-31"));
            }
        }
        EntityLabel::YearBefore => {
            if let Some(year) = first_year_token(text) {
                return Some(format!("lt{year}-01-01"));
            }
        }
        _ => {}
    }

    for (fmt, pattern) in DATE_PATTERNS.iter() {
        if let Some(matched) = pattern.find(text) {
            if let Ok(date) = NaiveDate::parse_from_str(matched.as_str(), fmt) {
                return Some(date.format("%Y-%m-%d").to_string());
            }
        }
    }

    // Bare year as last resort, if plausible
    if let Some(year) = first_year_token(text) {
        if (1900..=2100).contains(&year.parse::<i32>().unwrap_or(0)) {
            return Some(year.to_string());
        }
    }

    None
}

fn first_year_token(text: &str) -> Option<&str> {
    YEAR_TOKEN.find(text).map(|m| m.as_str())
}

/// Convert an age expression to a FHIR birthdate search value.
///
/// "over N" means born before `current_year − N`, so it maps to an `lt`
/// filter; "under N" maps to `gt`; an exact age carries no comparator.
pub fn normalize_age(entity: &Entity) -> Option<String> {
    normalize_age_in_year(entity, Utc::now().year())
}

/// Age normalization against an explicit current year.
pub fn normalize_age_in_year(entity: &Entity, current_year: i32) -> Option<String> {
    let age: i32 = AGE_RUN.find(&entity.text)?.as_str().parse().ok()?;
    let birth_date = format!("{}-01-01", current_year - age);

    Some(match entity.label {
        EntityLabel::AgeOver => format!("lt{birth_date}"),
        EntityLabel::AgeUnder => format!("gt{birth_date}"),
        _ => birth_date,
    })
}
