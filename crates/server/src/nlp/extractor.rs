//! Rule-pattern entity extraction and the merged extraction pipeline.
//!
//! The rule table covers trigger words, contact/identifier shapes, year
//! and age expressions, gender terms, and exact-date shapes. Remote NER
//! models add person/location/organization spans and disease spans when
//! an inference token is configured; without one the rule layer alone
//! keeps the pipeline functional.

use regex::Regex;

use nlq_core::{Entity, EntityLabel};

use super::inference::{DISEASE_NER_MODEL, GENERAL_NER_MODEL, InferenceClient};
use crate::error::AppError;

/// Rule patterns, in priority order. Ties on overlapping equal-length
/// spans go to the earlier pattern.
const PATTERN_TABLE: [(EntityLabel, &str); 24] = [
    // Contact
    (
        EntityLabel::Phone,
        r"\+\d{1,3}[\s-]?\d{3,4}[\s-]?\d{3,4}[\s-]?\d{3,4}",
    ),
    (EntityLabel::Phone, r"\b\d{10,15}\b"),
    (EntityLabel::Phone, r"\+\d+"),
    (
        EntityLabel::Email,
        r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+",
    ),
    // Identifiers
    (EntityLabel::Identifier, r"\b\d{9}\b"),
    (EntityLabel::Identifier, r"\b[A-Z0-9]{6,10}\b"),
    // Name triggers
    (
        EntityLabel::GivenNameTrigger,
        r"(?i)\b(?:first name|given name|forename|personal name)\b",
    ),
    (
        EntityLabel::FamilyNameTrigger,
        r"(?i)\b(?:last name|family name|surname|second name|clan name|maiden name)\b",
    ),
    (
        EntityLabel::NameGeneral,
        r"(?i)\b(?:known as|middle name|a\.k\.a|named|called|alias|aka|name)\b",
    ),
    // Birth / death keywords
    (
        EntityLabel::DeathKeyword,
        r"(?i)\b(?:passed away|died|deceased)\b",
    ),
    (EntityLabel::BirthKeyword, r"(?i)\b(?:born|birth|dob)\b"),
    // Year shapes
    (EntityLabel::YearRange, r"(?i)\b\d{4}\s*(?:to|and|-)\s*\d{4}\b"),
    (EntityLabel::YearAfter, r"(?i)\b(?:after|gt|greater)\s+\d{4}\b"),
    (EntityLabel::YearBefore, r"(?i)\b(?:before|lt|less)\s+\d{4}\b"),
    (EntityLabel::OnYear, r"(?i)\b(?:in|on)\s+\d{4}\b"),
    // Age shapes
    (
        EntityLabel::AgeOver,
        r"(?i)\b(?:over|older|above|greater|more)(?:\s+than)?\s+\d{1,3}\b",
    ),
    (
        EntityLabel::AgeUnder,
        r"(?i)\b(?:under|younger|below|less)(?:\s+than)?\s+\d{1,3}\b",
    ),
    (
        EntityLabel::AgeExact,
        r"(?i)\b(?:aged|age|is|years|year)\s+\d{1,3}\b",
    ),
    (EntityLabel::Age, r"(?i)\b(?:a\s+)?\d{1,3}\s*-\s*years?\b"),
    (EntityLabel::Age, r"(?i)\b\d{1,3}\s+years?(?:\s+old)?\b"),
    // Gender
    (EntityLabel::GenderMale, r"(?i)\b(?:male|man|boys|boy|m)\b"),
    (
        EntityLabel::GenderFemale,
        r"(?i)\b(?:female|woman|girls|girl|f)\b",
    ),
    (
        EntityLabel::GenderOther,
        r"(?i)\b(?:non-binary|transgender|genderqueer|agender|lgbtq|other|unknown|nb)\b",
    ),
    // GP triggers
    (
        EntityLabel::GpTrigger,
        r"(?i)\b(?:family doctor|primary care provider|patients of|patients seeing|assigned to|managed by|supervised by|provider code|who go to|co-managing|attending|covering|doctor|physician|seeing|under|npi|dea|gp|dr)\b",
    ),
];

/// Exact-date shapes; the resolver's date normalizer re-parses the text,
/// the extractor only needs to tag the span. Abbreviated month names
/// are covered by the word-based shapes.
const DATE_SHAPES: [&str; 6] = [
    r"\b\d{4}-\d{1,2}-\d{1,2}\b",
    r"\b\d{4}/\d{1,2}/\d{1,2}\b",
    r"\b\d{1,2}-\d{1,2}-\d{4}\b",
    r"\b\d{1,2}/\d{1,2}/\d{4}\b",
    r"\b[A-Za-z]+ \d{1,2}, \d{4}\b",
    r"\b\d{1,2} [A-Za-z]+ \d{4}\b",
];

/// Regex-based extractor over the rule pattern table
pub struct RuleExtractor {
    patterns: Vec<(EntityLabel, Regex)>,
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleExtractor {
    /// Compile the pattern table
    pub fn new() -> Self {
        let mut patterns: Vec<(EntityLabel, Regex)> = PATTERN_TABLE
            .iter()
            .map(|(label, pattern)| (*label, Regex::new(pattern).expect("static rule pattern")))
            .collect();
        for shape in DATE_SHAPES {
            patterns.push((
                EntityLabel::Date,
                Regex::new(shape).expect("static date shape"),
            ));
        }
        Self { patterns }
    }

    /// All raw matches, tagged with their pattern rank
    fn matches(&self, text: &str) -> Vec<(Entity, usize)> {
        let mut found = Vec::new();
        for (rank, (label, pattern)) in self.patterns.iter().enumerate() {
            for m in pattern.find_iter(text) {
                found.push((
                    Entity::new(m.as_str(), *label, m.start(), m.end()),
                    rank,
                ));
            }
        }
        found
    }

    /// Extract non-overlapping entities, position-sorted
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        filter_spans(self.matches(text))
    }
}

/// Resolve overlaps the way spaCy's span filter does: longer spans win,
/// then earlier spans, then earlier patterns; survivors come back sorted
/// by position.
fn filter_spans(mut candidates: Vec<(Entity, usize)>) -> Vec<Entity> {
    candidates.sort_by(|(a, ra), (b, rb)| {
        (b.end - b.start)
            .cmp(&(a.end - a.start))
            .then(a.start.cmp(&b.start))
            .then(ra.cmp(rb))
    });

    let mut kept: Vec<Entity> = Vec::new();
    for (entity, _) in candidates {
        let overlaps = kept
            .iter()
            .any(|k| entity.start < k.end && k.start < entity.end);
        if !overlaps {
            kept.push(entity);
        }
    }
    kept.sort_by_key(|e| (e.start, e.end));
    kept
}

/// Full extraction pipeline: rule spans merged with optional remote NER
/// spans, disease-model spans appended last.
pub struct EntityPipeline {
    rules: RuleExtractor,
    client: Option<InferenceClient>,
}

impl EntityPipeline {
    pub fn new(client: Option<InferenceClient>) -> Self {
        Self {
            rules: RuleExtractor::new(),
            client,
        }
    }

    /// Extract and merge entities from all configured sources into one
    /// flat list. Tags the models mark as "no entity" are dropped.
    pub async fn extract(&self, text: &str) -> Result<Vec<Entity>, AppError> {
        let mut candidates = self.rules.matches(text);

        if let Some(client) = &self.client {
            let spans = client
                .token_ner(GENERAL_NER_MODEL, text)
                .await
                .map_err(AppError::Inference)?;
            // Ranked after every rule pattern: rules win overlap ties
            let base_rank = self.rules.patterns.len();
            for span in spans {
                let label = EntityLabel::from_tag(&span.entity_group);
                if label == EntityLabel::Unknown {
                    continue;
                }
                candidates.push((
                    Entity::new(span.word.trim(), label, span.start, span.end),
                    base_rank,
                ));
            }
        }

        let mut entities = filter_spans(candidates);

        if let Some(client) = &self.client {
            let spans = client
                .token_ner(DISEASE_NER_MODEL, text)
                .await
                .map_err(AppError::Inference)?;
            for span in spans {
                let label = EntityLabel::from_tag(&span.entity_group);
                if label == EntityLabel::Unknown {
                    continue;
                }
                entities.push(Entity::new(span.word.trim(), label, span.start, span.end));
            }
        }

        Ok(entities)
    }
}
