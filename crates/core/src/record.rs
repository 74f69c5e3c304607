//! The working patient record populated during resolution.

use std::collections::BTreeMap;

/// Target fields a resolved entity can land in.
///
/// Declaration order is the order fields appear in generated query
/// strings (`BTreeMap` iteration follows `Ord`, which follows this
/// declaration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Identifier,
    Name,
    Family,
    Given,
    Gender,
    Birthdate,
    Address,
    AddressCity,
    AddressState,
    Deceased,
    DeceasedDate,
    Phone,
    Email,
    GeneralPractitioner,
    Organization,
    Condition,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 16] = [
        Field::Identifier,
        Field::Name,
        Field::Family,
        Field::Given,
        Field::Gender,
        Field::Birthdate,
        Field::Address,
        Field::AddressCity,
        Field::AddressState,
        Field::Deceased,
        Field::DeceasedDate,
        Field::Phone,
        Field::Email,
        Field::GeneralPractitioner,
        Field::Organization,
        Field::Condition,
    ];

    /// Search-parameter name used in generated query strings.
    pub fn param_name(self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::Name => "name",
            Field::Family => "family",
            Field::Given => "given",
            Field::Gender => "gender",
            Field::Birthdate => "birthdate",
            Field::Address => "address",
            Field::AddressCity => "address-city",
            Field::AddressState => "address-state",
            Field::Deceased => "deceased",
            Field::DeceasedDate => "deceased-date",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::GeneralPractitioner => "general-practitioner",
            Field::Organization => "organization",
            Field::Condition => "condition",
        }
    }

    /// Key used in create/update resource bodies.
    ///
    /// Fields with structural handling (name parts, telecom, address
    /// parts) are assembled by the request builder and never pass through
    /// this mapping.
    pub fn resource_key(self) -> &'static str {
        match self {
            Field::Birthdate => "birthDate",
            Field::Deceased => "deceasedBoolean",
            Field::DeceasedDate => "deceasedDateTime",
            Field::GeneralPractitioner => "generalPractitioner",
            Field::Organization => "managingOrganization",
            other => other.param_name(),
        }
    }
}

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// Mutable record owned by the engine for the duration of one query.
///
/// A field, once set, is never overwritten ("first successful write
/// wins"); filled and skipped fields partition the full field set at all
/// times.
#[derive(Debug, Clone, Default)]
pub struct PatientRecord {
    fields: BTreeMap<Field, FieldValue>,
}

impl PatientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into `field` unless the field is already filled.
    /// Returns whether a write happened.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        if self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, value);
        true
    }

    pub fn set_text(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.set(field, FieldValue::Text(value.into()))
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Text content of a field, if filled with text.
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.fields.get(&field) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_filled(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Filled fields in declaration order.
    pub fn filled_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    /// Complement of `filled_fields` over the full field set.
    pub fn skipped_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| !self.is_filled(*f))
    }

    /// Iterate filled (field, value) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut record = PatientRecord::new();
        assert!(record.set_text(Field::Given, "Jane"));
        assert!(!record.set_text(Field::Given, "John"));
        assert_eq!(record.text(Field::Given), Some("Jane"));
    }

    #[test]
    fn test_filled_and_skipped_partition() {
        let mut record = PatientRecord::new();
        assert_eq!(record.skipped_fields().count(), Field::ALL.len());

        record.set_text(Field::Gender, "female");
        record.set(Field::Deceased, FieldValue::Flag(true));

        let filled: Vec<_> = record.filled_fields().collect();
        let skipped: Vec<_> = record.skipped_fields().collect();
        assert_eq!(filled.len() + skipped.len(), Field::ALL.len());
        assert!(filled.contains(&Field::Gender));
        assert!(!skipped.contains(&Field::Gender));
    }

    #[test]
    fn test_iteration_order_is_declaration_order() {
        let mut record = PatientRecord::new();
        record.set_text(Field::Condition, "asthma");
        record.set_text(Field::Gender, "male");
        record.set_text(Field::Identifier, "123456789");

        let order: Vec<_> = record.filled_fields().collect();
        assert_eq!(
            order,
            vec![Field::Identifier, Field::Gender, Field::Condition]
        );
    }
}
