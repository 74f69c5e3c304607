//! Entity-to-field resolution.
//!
//! One pass over the entity list in caller-supplied order — no resort —
//! followed by the position-agnostic context fallback. Normalizers
//! receive the full entity list because the value a trigger qualifies
//! can appear anywhere in it.

use crate::entity::{Entity, EntityLabel};
use crate::normalize::{normalize_age, normalize_date};
use crate::record::{Field, FieldValue, PatientRecord};

/// Resolve an entity list into a patient record.
pub fn resolve(entities: &[Entity]) -> PatientRecord {
    let mut record = PatientRecord::new();

    for entity in entities {
        let text = entity.text.trim();
        if text.is_empty() {
            continue;
        }

        // Direct 1:1 label-to-field mappings need no context
        if let Some(field) = direct_field(entity.label) {
            record.set_text(field, text);
            continue;
        }

        // A death keyword always flags the record as deceased; the same
        // trigger still reaches its normalizer for a date lookup below
        if entity.label == EntityLabel::DeathKeyword {
            record.set(Field::Deceased, FieldValue::Flag(true));
        }

        if let Some((value, field)) = normalize_entity(entity, entities) {
            record.set_text(field, value);
        }
    }

    fill_name_from_context(&mut record, entities);
    fill_age_from_context(&mut record, entities);

    record
}

/// Labels that map straight onto a field.
fn direct_field(label: EntityLabel) -> Option<Field> {
    match label {
        EntityLabel::Identifier => Some(Field::Identifier),
        EntityLabel::Phone => Some(Field::Phone),
        EntityLabel::Email => Some(Field::Email),
        EntityLabel::Gpe | EntityLabel::Loc | EntityLabel::Fac => Some(Field::Address),
        EntityLabel::Organization => Some(Field::Organization),
        _ => None,
    }
}

/// Dispatch a trigger to its normalizer. Unrecognized labels are a
/// silent no-op.
fn normalize_entity(entity: &Entity, all: &[Entity]) -> Option<(String, Field)> {
    match entity.label {
        EntityLabel::GpTrigger => normalize_gp(entity, all),
        EntityLabel::GivenNameTrigger | EntityLabel::FamilyNameTrigger | EntityLabel::NameGeneral => {
            normalize_name(entity, all)
        }
        EntityLabel::BirthKeyword | EntityLabel::DeathKeyword => {
            normalize_lifecycle_date(entity, all)
        }
        EntityLabel::GenderFemale | EntityLabel::GenderMale | EntityLabel::GenderOther => {
            Some(normalize_gender(entity.label))
        }
        EntityLabel::ConditionHead | EntityLabel::ConditionTail => {
            normalize_condition(entity, all)
        }
        _ => None,
    }
}

/// First person span at or after the trigger fills the field the
/// trigger kind implies.
fn normalize_name(trigger: &Entity, all: &[Entity]) -> Option<(String, Field)> {
    let field = match trigger.label {
        EntityLabel::GivenNameTrigger => Field::Given,
        EntityLabel::FamilyNameTrigger => Field::Family,
        _ => Field::Name,
    };
    all.iter()
        .find(|e| e.label == EntityLabel::Person && e.start >= trigger.end)
        .map(|person| (person.text.clone(), field))
}

/// First person span strictly after the trigger is the practitioner.
/// Strictly-after here vs at-or-after in [`normalize_name`] is
/// intentional: a GP trigger token is never itself part of the name.
fn normalize_gp(trigger: &Entity, all: &[Entity]) -> Option<(String, Field)> {
    all.iter()
        .find(|e| e.label == EntityLabel::Person && e.start > trigger.end)
        .map(|person| (person.text.clone(), Field::GeneralPractitioner))
}

fn normalize_gender(label: EntityLabel) -> (String, Field) {
    let gender = match label {
        EntityLabel::GenderFemale => "female",
        EntityLabel::GenderMale => "male",
        _ => "other",
    };
    (gender.to_string(), Field::Gender)
}

/// A birth or death keyword claims the first date-like or age-like
/// entity that starts after it, whichever comes first in list order.
fn normalize_lifecycle_date(trigger: &Entity, all: &[Entity]) -> Option<(String, Field)> {
    let field = match trigger.label {
        EntityLabel::BirthKeyword => Field::Birthdate,
        _ => Field::DeceasedDate,
    };
    let candidate = all
        .iter()
        .find(|e| (e.label.is_date_like() || e.label.is_age_like()) && e.start > trigger.end)?;

    let value = if candidate.label.is_date_like() {
        normalize_date(candidate)?
    } else {
        normalize_age(candidate)?
    };
    Some((value, field))
}

/// Stitch a two-part disease mention into one phrase.
///
/// A head span absorbs a tail span that begins exactly one character
/// after it ends (the separating space); a tail span in that position
/// is already consumed and resolves to absent, so the phrase is emitted
/// exactly once. A lone tail emits its own text.
fn normalize_condition(entity: &Entity, all: &[Entity]) -> Option<(String, Field)> {
    match entity.label {
        EntityLabel::ConditionHead => {
            let mut phrase = entity.text.clone();
            if let Some(tail) = all
                .iter()
                .find(|e| e.label == EntityLabel::ConditionTail && e.start == entity.end + 1)
            {
                phrase.push(' ');
                phrase.push_str(&tail.text);
            }
            Some((phrase, Field::Condition))
        }
        EntityLabel::ConditionTail => {
            let consumed = all
                .iter()
                .any(|e| e.label == EntityLabel::ConditionHead && e.end + 1 == entity.start);
            if consumed {
                None
            } else {
                Some((entity.text.clone(), Field::Condition))
            }
        }
        _ => None,
    }
}

/// Fallback: when no name-like field resolved, the first person span
/// anywhere in the list becomes the general name.
fn fill_name_from_context(record: &mut PatientRecord, entities: &[Entity]) {
    let has_name = [Field::Given, Field::Family, Field::GeneralPractitioner]
        .iter()
        .any(|f| record.is_filled(*f));
    if has_name {
        return;
    }
    if let Some(person) = entities.iter().find(|e| e.label == EntityLabel::Person) {
        record.set_text(Field::Name, person.text.clone());
    }
}

/// Fallback: when no birth or death date resolved, the first age
/// expression anywhere in the list becomes the birthdate.
fn fill_age_from_context(record: &mut PatientRecord, entities: &[Entity]) {
    if record.is_filled(Field::Birthdate) || record.is_filled(Field::DeceasedDate) {
        return;
    }
    if let Some(age) = entities.iter().find(|e| e.label.is_age_like()) {
        if let Some(value) = normalize_age(age) {
            record.set_text(Field::Birthdate, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    fn ent(text: &str, label: EntityLabel, start: usize) -> Entity {
        Entity::new(text, label, start, start + text.len())
    }

    #[test]
    fn test_empty_list_resolves_empty_record() {
        let record = resolve(&[]);
        assert!(record.is_empty());
    }

    #[test]
    fn test_direct_mappings() {
        let entities = vec![
            ent("123456789", EntityLabel::Identifier, 20),
            ent("+1 555 0100", EntityLabel::Phone, 35),
            ent("jane@example.org", EntityLabel::Email, 50),
            ent("Boston", EntityLabel::Gpe, 70),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Identifier), Some("123456789"));
        assert_eq!(record.text(Field::Phone), Some("+1 555 0100"));
        assert_eq!(record.text(Field::Email), Some("jane@example.org"));
        assert_eq!(record.text(Field::Address), Some("Boston"));
    }

    #[test]
    fn test_first_write_wins_across_entities() {
        let entities = vec![
            ent("Boston", EntityLabel::Gpe, 10),
            ent("Chicago", EntityLabel::Loc, 30),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Address), Some("Boston"));
    }

    #[test]
    fn test_blank_entities_are_skipped() {
        let entities = vec![
            ent("   ", EntityLabel::Gpe, 0),
            ent("Boston", EntityLabel::Gpe, 10),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Address), Some("Boston"));
    }

    #[test]
    fn test_name_trigger_takes_following_person() {
        let entities = vec![
            ent("first name", EntityLabel::GivenNameTrigger, 0),
            ent("Jane", EntityLabel::Person, 11),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Given), Some("Jane"));
        // Fallback must not also write the general name
        assert_eq!(record.text(Field::Name), None);
    }

    #[test]
    fn test_name_trigger_ignores_preceding_person() {
        let entities = vec![
            ent("Jane", EntityLabel::Person, 0),
            ent("surname", EntityLabel::FamilyNameTrigger, 10),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Family), None);
        // ...but the fallback picks the person up as a general name
        assert_eq!(record.text(Field::Name), Some("Jane"));
    }

    #[test]
    fn test_gp_requires_strictly_following_person() {
        // Person starting exactly at the trigger end is not a GP match
        let entities = vec![
            ent("Dr", EntityLabel::GpTrigger, 0),
            ent("House", EntityLabel::Person, 2),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::GeneralPractitioner), None);
        assert_eq!(record.text(Field::Name), Some("House"));

        let entities = vec![
            ent("Dr", EntityLabel::GpTrigger, 0),
            ent("House", EntityLabel::Person, 3),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::GeneralPractitioner), Some("House"));
    }

    #[test]
    fn test_gender_triggers() {
        let record = resolve(&[ent("female", EntityLabel::GenderFemale, 9)]);
        assert_eq!(record.text(Field::Gender), Some("female"));

        let record = resolve(&[ent("man", EntityLabel::GenderMale, 0)]);
        assert_eq!(record.text(Field::Gender), Some("male"));

        let record = resolve(&[ent("non-binary", EntityLabel::GenderOther, 0)]);
        assert_eq!(record.text(Field::Gender), Some("other"));
    }

    #[test]
    fn test_birth_keyword_claims_following_date() {
        let entities = vec![
            ent("born", EntityLabel::BirthKeyword, 20),
            ent("after 1990", EntityLabel::YearAfter, 25),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Birthdate), Some("gt1990-12-31"));
    }

    #[test]
    fn test_death_keyword_sets_flag_and_date() {
        let entities = vec![
            ent("died", EntityLabel::DeathKeyword, 10),
            ent("in 2015", EntityLabel::OnYear, 15),
        ];
        let record = resolve(&entities);
        assert_eq!(record.get(Field::Deceased), Some(&FieldValue::Flag(true)));
        assert_eq!(record.text(Field::DeceasedDate), Some("2015"));
    }

    #[test]
    fn test_death_keyword_without_date_still_flags() {
        let record = resolve(&[ent("deceased", EntityLabel::DeathKeyword, 0)]);
        assert_eq!(record.get(Field::Deceased), Some(&FieldValue::Flag(true)));
        assert!(!record.is_filled(Field::DeceasedDate));
    }

    #[test]
    fn test_birth_keyword_ignores_preceding_date() {
        let entities = vec![
            ent("in 1990", EntityLabel::OnYear, 0),
            ent("born", EntityLabel::BirthKeyword, 20),
        ];
        let record = resolve(&entities);
        // No date follows the trigger; the fallback only handles ages
        assert!(!record.is_filled(Field::Birthdate));
    }

    #[test]
    fn test_condition_stitching_emits_once() {
        // "chronic kidney disease" tagged as head + adjacent tail
        let entities = vec![
            ent("chronic", EntityLabel::ConditionHead, 14),
            ent("kidney disease", EntityLabel::ConditionTail, 22),
        ];
        let record = resolve(&entities);
        assert_eq!(
            record.text(Field::Condition),
            Some("chronic kidney disease")
        );
    }

    #[test]
    fn test_condition_tail_first_in_list_still_consumed() {
        let entities = vec![
            ent("kidney disease", EntityLabel::ConditionTail, 22),
            ent("chronic", EntityLabel::ConditionHead, 14),
        ];
        let record = resolve(&entities);
        assert_eq!(
            record.text(Field::Condition),
            Some("chronic kidney disease")
        );
    }

    #[test]
    fn test_lone_condition_tail_emits_itself() {
        let record = resolve(&[ent("asthma", EntityLabel::ConditionTail, 10)]);
        assert_eq!(record.text(Field::Condition), Some("asthma"));
    }

    #[test]
    fn test_non_adjacent_tail_not_stitched() {
        let entities = vec![
            ent("chronic", EntityLabel::ConditionHead, 0),
            ent("fatigue", EntityLabel::ConditionTail, 10),
        ];
        let record = resolve(&entities);
        // Head emits alone; the tail is two characters away
        assert_eq!(record.text(Field::Condition), Some("chronic"));
    }

    #[test]
    fn test_age_fallback_fills_birthdate() {
        let year = Utc::now().year();
        let record = resolve(&[ent("aged 30", EntityLabel::AgeExact, 14)]);
        assert_eq!(
            record.text(Field::Birthdate),
            Some(format!("{}-01-01", year - 30).as_str())
        );
    }

    #[test]
    fn test_age_fallback_skipped_when_birthdate_resolved() {
        let entities = vec![
            ent("born", EntityLabel::BirthKeyword, 0),
            ent("in 1980", EntityLabel::OnYear, 5),
            ent("over 50", EntityLabel::AgeOver, 20),
        ];
        let record = resolve(&entities);
        assert_eq!(record.text(Field::Birthdate), Some("1980"));
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let record = resolve(&[ent("something", EntityLabel::Unknown, 0)]);
        assert!(record.is_empty());
    }
}
