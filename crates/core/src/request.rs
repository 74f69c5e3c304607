//! Serialization of a resolved record into protocol request payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use crate::condition;
use crate::error::EngineError;
use crate::record::{Field, FieldValue, PatientRecord};

/// Declared request intent, as classified upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Search => "search",
            Intent::Create => "create",
            Intent::Update => "update",
            Intent::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// HTTP method of a generated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        };
        f.write_str(name)
    }
}

/// The engine's output: one outbound request, fully described.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

/// Build the request for the given intent from a resolved record.
pub fn build(
    intent: Intent,
    record: &PatientRecord,
    base_url: &str,
) -> Result<RequestDescriptor, EngineError> {
    match intent {
        Intent::Search => Ok(build_search(record, base_url)),
        Intent::Create => Ok(build_create(record, base_url)),
        Intent::Update => build_update(record, base_url),
        other => Err(EngineError::UnsupportedIntent(other)),
    }
}

/// GET search over the Patient collection.
///
/// Every filled field except the condition becomes a query parameter;
/// the condition is coded and attached as a reverse-chained parameter on
/// the related Condition resource.
fn build_search(record: &PatientRecord, base_url: &str) -> RequestDescriptor {
    if record.is_empty() {
        return RequestDescriptor {
            method: Method::Get,
            url: format!("{base_url}/Patient"),
            parameters: Some(Map::new()),
            query_string: Some(String::new()),
            body: None,
        };
    }

    let mut pairs: Vec<String> = Vec::new();
    let mut parameters = Map::new();

    for (field, value) in record.iter() {
        if field == Field::Condition {
            continue;
        }
        let name = field.param_name();
        match value {
            FieldValue::Flag(flag) => {
                pairs.push(format!("{name}={flag}"));
                parameters.insert(name.to_string(), json!(flag));
            }
            FieldValue::Text(text) => {
                pairs.push(format!("{name}={}", text.replace(' ', "%20")));
                parameters.insert(name.to_string(), json!(text));
            }
        }
    }

    if let Some(phrase) = record.text(Field::Condition) {
        let code = condition::code_for(phrase);
        pairs.push(format!("_has:Condition:patient:code={code}"));
        parameters.insert("_has:Condition:patient:code".to_string(), json!(code));
    }

    let query_string = pairs.join("&");
    let url = if query_string.is_empty() {
        format!("{base_url}/Patient")
    } else {
        format!("{base_url}/Patient?{query_string}")
    };

    RequestDescriptor {
        method: Method::Get,
        url,
        parameters: Some(parameters),
        query_string: Some(query_string),
        body: None,
    }
}

/// POST a new Patient resource.
fn build_create(record: &PatientRecord, base_url: &str) -> RequestDescriptor {
    RequestDescriptor {
        method: Method::Post,
        url: format!("{base_url}/Patient"),
        parameters: None,
        query_string: None,
        body: Some(patient_resource(record)),
    }
}

/// PUT against the identified Patient; the identifier is mandatory.
fn build_update(record: &PatientRecord, base_url: &str) -> Result<RequestDescriptor, EngineError> {
    let id = record
        .text(Field::Identifier)
        .ok_or(EngineError::MissingIdentifier)?;

    Ok(RequestDescriptor {
        method: Method::Put,
        url: format!("{base_url}/Patient/{id}"),
        parameters: None,
        query_string: None,
        body: Some(patient_resource(record)),
    })
}

/// Assemble the Patient JSON body shared by create and update.
fn patient_resource(record: &PatientRecord) -> JsonValue {
    let mut resource = Map::new();
    resource.insert("resourceType".to_string(), json!("Patient"));

    // Name parts combine into one structured entry; a bare general name
    // becomes a text entry instead
    let mut name_entry = Map::new();
    if let Some(family) = record.text(Field::Family) {
        name_entry.insert("family".to_string(), json!(family));
    }
    if let Some(given) = record.text(Field::Given) {
        name_entry.insert("given".to_string(), json!([given]));
    }
    if name_entry.is_empty() {
        if let Some(name) = record.text(Field::Name) {
            name_entry.insert("text".to_string(), json!(name));
        }
    }
    if !name_entry.is_empty() {
        resource.insert("name".to_string(), json!([name_entry]));
    }

    // Contact points collect into telecom, tagged by system
    let mut telecom = Vec::new();
    if let Some(phone) = record.text(Field::Phone) {
        telecom.push(json!({"system": "phone", "value": phone}));
    }
    if let Some(email) = record.text(Field::Email) {
        telecom.push(json!({"system": "email", "value": email}));
    }
    if !telecom.is_empty() {
        resource.insert("telecom".to_string(), json!(telecom));
    }

    // Address parts nest into a single address object
    let mut address = Map::new();
    if let Some(text) = record.text(Field::Address) {
        address.insert("text".to_string(), json!(text));
    }
    if let Some(city) = record.text(Field::AddressCity) {
        address.insert("city".to_string(), json!(city));
    }
    if let Some(state) = record.text(Field::AddressState) {
        address.insert("state".to_string(), json!(state));
    }
    if !address.is_empty() {
        resource.insert("address".to_string(), json!([address]));
    }

    // Everything else passes through under its payload key
    for (field, value) in record.iter() {
        if matches!(
            field,
            Field::Name
                | Field::Family
                | Field::Given
                | Field::Phone
                | Field::Email
                | Field::Address
                | Field::AddressCity
                | Field::AddressState
        ) {
            continue;
        }
        let entry = match value {
            FieldValue::Flag(flag) => json!(flag),
            FieldValue::Text(text) => json!(text),
        };
        resource.insert(field.resource_key().to_string(), entry);
    }

    JsonValue::Object(resource)
}
