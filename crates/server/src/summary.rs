//! Flattening of searchset bundles into per-patient rows and summary
//! statistics.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Reverse-chain parameter whose presence marks a condition search
const CONDITION_PARAM: &str = "_has:Condition:patient:code";

/// One flattened patient row
#[derive(Debug, Serialize)]
pub struct PatientRow {
    pub name: String,
    pub gender: String,
    pub age: Option<i32>,
    pub age_group: &'static str,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Aggregated counters over the result set
#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_patients: usize,
    pub gender_distribution: BTreeMap<String, usize>,
    pub age_distribution: BTreeMap<String, usize>,
    pub locations: Locations,
}

#[derive(Debug, Serialize)]
pub struct Locations {
    pub cities: BTreeMap<String, usize>,
    pub states: BTreeMap<String, usize>,
}

/// Flattened query result returned to the caller
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub query: Map<String, JsonValue>,
    pub summary: Summary,
    pub patients: Vec<PatientRow>,
}

/// Age in whole years derived from the birth year
pub fn calculate_age(birthdate: &str, current_year: i32) -> Option<i32> {
    let year: i32 = birthdate.split('-').next()?.parse().ok()?;
    Some(current_year - year)
}

/// Bucket an age into the reporting groups
pub fn categorize_age(age: Option<i32>) -> &'static str {
    match age {
        None => "unknown",
        Some(a) if a <= 18 => "0-18",
        Some(a) if a <= 35 => "19-35",
        Some(a) if a <= 50 => "36-50",
        Some(a) if a <= 65 => "51-65",
        Some(_) => "66+",
    }
}

/// Flatten a Patient searchset bundle into rows plus summary counters.
///
/// `params` is the generated request's parameter map; when it carries
/// the condition reverse-chain parameter, its code is attached to every
/// row.
pub fn simplify(bundle: &JsonValue, params: &Map<String, JsonValue>) -> QueryResult {
    let current_year = Utc::now().year();
    let condition_code = params
        .get(CONDITION_PARAM)
        .and_then(|v| v.as_str())
        .map(String::from);

    let mut patients = Vec::new();
    let mut gender_counter: BTreeMap<String, usize> = BTreeMap::new();
    let mut age_counter: BTreeMap<String, usize> = BTreeMap::new();
    let mut city_counter: BTreeMap<String, usize> = BTreeMap::new();
    let mut state_counter: BTreeMap<String, usize> = BTreeMap::new();

    let entries = bundle
        .get("entry")
        .and_then(|e| e.as_array())
        .cloned()
        .unwrap_or_default();

    for entry in &entries {
        let Some(resource) = entry.get("resource").filter(|r| r.is_object()) else {
            continue;
        };

        let name = resource
            .get("name")
            .and_then(|n| n.as_array())
            .and_then(|names| names.first())
            .map(|first| {
                let given = first
                    .get("given")
                    .and_then(|g| g.as_array())
                    .and_then(|g| g.first())
                    .and_then(|g| g.as_str())
                    .unwrap_or("");
                let family = first.get("family").and_then(|f| f.as_str()).unwrap_or("");
                format!("{given} {family}").trim().to_string()
            })
            .unwrap_or_default();

        let birth_date = resource
            .get("birthDate")
            .and_then(|b| b.as_str())
            .map(String::from);
        let age = birth_date
            .as_deref()
            .and_then(|b| calculate_age(b, current_year));
        let age_group = categorize_age(age);
        let gender = resource
            .get("gender")
            .and_then(|g| g.as_str())
            .unwrap_or("unknown")
            .to_string();

        let address = resource
            .get("address")
            .and_then(|a| a.as_array())
            .and_then(|a| a.first());
        let city = address
            .and_then(|a| a.get("city"))
            .and_then(|c| c.as_str())
            .map(String::from);
        let state = address
            .and_then(|a| a.get("state"))
            .and_then(|s| s.as_str())
            .map(String::from);

        *gender_counter.entry(gender.clone()).or_default() += 1;
        *age_counter.entry(age_group.to_string()).or_default() += 1;
        if let Some(city) = &city {
            *city_counter.entry(city.clone()).or_default() += 1;
        }
        if let Some(state) = &state {
            *state_counter.entry(state.clone()).or_default() += 1;
        }

        patients.push(PatientRow {
            name,
            gender,
            age,
            age_group,
            birth_date,
            city,
            state,
            condition: condition_code.clone(),
        });
    }

    QueryResult {
        query: params.clone(),
        summary: Summary {
            total_patients: patients.len(),
            gender_distribution: gender_counter,
            age_distribution: age_counter,
            locations: Locations {
                cities: city_counter,
                states: state_counter,
            },
        },
        patients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_calculate_age() {
        assert_eq!(calculate_age("1990-05-15", 2026), Some(36));
        assert_eq!(calculate_age("2000", 2026), Some(26));
        assert_eq!(calculate_age("not-a-date", 2026), None);
        assert_eq!(calculate_age("", 2026), None);
    }

    #[test]
    fn test_categorize_age() {
        assert_eq!(categorize_age(None), "unknown");
        assert_eq!(categorize_age(Some(10)), "0-18");
        assert_eq!(categorize_age(Some(18)), "0-18");
        assert_eq!(categorize_age(Some(19)), "19-35");
        assert_eq!(categorize_age(Some(50)), "36-50");
        assert_eq!(categorize_age(Some(51)), "51-65");
        assert_eq!(categorize_age(Some(80)), "66+");
    }

    #[test]
    fn test_simplify_counts_and_rows() {
        let year = Utc::now().year();
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {
                    "resourceType": "Patient",
                    "name": [{"family": "Smith", "given": ["Jane"]}],
                    "gender": "female",
                    "birthDate": format!("{}-01-01", year - 40),
                    "address": [{"city": "Boston", "state": "MA"}]
                }},
                {"resource": {
                    "resourceType": "Patient",
                    "gender": "female",
                    "address": [{"city": "Boston"}]
                }},
                {"resource": {
                    "resourceType": "Patient",
                    "name": [{"family": "Lee"}],
                    "gender": "male",
                    "birthDate": format!("{}-06-30", year - 70)
                }},
                {}
            ]
        });

        let params = Map::new();
        let result = simplify(&bundle, &params);

        assert_eq!(result.summary.total_patients, 3);
        assert_eq!(result.summary.gender_distribution["female"], 2);
        assert_eq!(result.summary.gender_distribution["male"], 1);
        assert_eq!(result.summary.age_distribution["36-50"], 1);
        assert_eq!(result.summary.age_distribution["unknown"], 1);
        assert_eq!(result.summary.age_distribution["66+"], 1);
        assert_eq!(result.summary.locations.cities["Boston"], 2);
        assert_eq!(result.summary.locations.states["MA"], 1);

        assert_eq!(result.patients[0].name, "Jane Smith");
        assert_eq!(result.patients[0].age_group, "36-50");
        assert_eq!(result.patients[2].name, "Lee");
        assert!(result.patients[0].condition.is_none());
    }

    #[test]
    fn test_simplify_attaches_condition_code() {
        let bundle = json!({
            "entry": [{"resource": {"resourceType": "Patient", "gender": "male"}}]
        });
        let mut params = Map::new();
        params.insert("_has:Condition:patient:code".into(), json!("73211009"));

        let result = simplify(&bundle, &params);
        assert_eq!(result.patients[0].condition.as_deref(), Some("73211009"));
    }

    #[test]
    fn test_simplify_empty_bundle() {
        let result = simplify(&json!({"resourceType": "Bundle"}), &Map::new());
        assert_eq!(result.summary.total_patients, 0);
        assert!(result.patients.is_empty());
    }
}
