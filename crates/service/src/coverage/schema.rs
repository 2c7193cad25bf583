//! Input validation and output shapes for the coverage API.
//!
//! Validation never stops at the first problem: every offending field is
//! collected into [`FieldErrors`] so callers can fix a payload in one round.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use models::coverage::{self, CoverageFields, Model, FIELDS, MAX_FIELD_LEN};
use serde::Serialize;
use serde_json::Value;

use crate::pagination::{Pagination, PaginationMeta, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE};

pub const MISSING_FIELD: &str = "Missing data for required field.";
pub const NULL_FIELD: &str = "Field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const NOT_A_BOOLEAN: &str = "Not a valid boolean.";
pub const INVALID_INPUT: &str = "Invalid input type.";

/// Key used for errors that concern the payload as a whole.
pub const SCHEMA_KEY: &str = "_schema";

/// Where the offending values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Json,
    Query,
}

impl Location {
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Json => "json",
            Location::Query => "query",
        }
    }
}

/// Per-field validation messages for one request location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    location: Location,
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new(location: Location) -> Self {
        Self { location, errors: BTreeMap::new() }
    }

    /// A single payload-level error.
    pub fn schema(message: impl Into<String>) -> Self {
        let mut errors = Self::new(Location::Json);
        errors.push(SCHEMA_KEY, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `{"<location>": {"<field>": ["<message>", ...]}}`
    pub fn to_detail(&self) -> Value {
        let mut inner = serde_json::Map::new();
        for (field, messages) in &self.errors {
            inner.insert(field.clone(), Value::from(messages.clone()));
        }
        let mut outer = serde_json::Map::new();
        outer.insert(self.location.as_str().to_string(), Value::Object(inner));
        Value::Object(outer)
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.location.as_str())?;
        for (i, (field, messages)) in self.errors.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{sep}{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

fn too_long() -> String {
    format!("Length must be between 0 and {MAX_FIELD_LEN}.")
}

/// Validate a creation body: every attribute present, a string, and at most
/// [`MAX_FIELD_LEN`] characters; no other keys.
pub fn parse_create_payload(body: &Value) -> Result<CoverageFields, FieldErrors> {
    let mut errors = FieldErrors::new(Location::Json);
    let Some(obj) = body.as_object() else {
        errors.push(SCHEMA_KEY, INVALID_INPUT);
        return Err(errors);
    };

    let mut fields = CoverageFields::new();
    for def in FIELDS.iter() {
        match obj.get(def.name) {
            None => errors.push(def.name, MISSING_FIELD),
            Some(Value::Null) => errors.push(def.name, NULL_FIELD),
            Some(Value::String(s)) if s.chars().count() > MAX_FIELD_LEN => errors.push(def.name, too_long()),
            Some(Value::String(s)) => fields.set(def, s.clone()),
            Some(_) => errors.push(def.name, NOT_A_STRING),
        }
    }
    for key in obj.keys() {
        if coverage::field(key).is_none() {
            errors.push(key.clone(), UNKNOWN_FIELD);
        }
    }
    errors.into_result(fields)
}

fn parse_int(params: &HashMap<String, String>, key: &str, default: u64, errors: &mut FieldErrors) -> Option<i64> {
    match params.get(key) {
        None => i64::try_from(default).ok(),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(key, NOT_AN_INTEGER);
                None
            }
        },
    }
}

/// `page` (default 1, >= 1) and `per_page` (default 20, 1..=255). Unknown
/// keys are ignored.
pub fn parse_list_query(params: &HashMap<String, String>) -> Result<Pagination, FieldErrors> {
    let mut errors = FieldErrors::new(Location::Query);
    let page = parse_int(params, "page", DEFAULT_PAGE, &mut errors);
    let per_page = parse_int(params, "per_page", DEFAULT_PER_PAGE, &mut errors);

    let mut out = Pagination::default();
    if let Some(page) = page {
        match u64::try_from(page) {
            Ok(p) if p >= 1 => out.page = p,
            _ => errors.push("page", "Must be greater than or equal to 1."),
        }
    }
    if let Some(per_page) = per_page {
        match u64::try_from(per_page) {
            Ok(p) if p > MAX_PER_PAGE => {
                errors.push("per_page", format!("Must be less than or equal to {MAX_PER_PAGE}."))
            }
            Ok(p) if p >= 1 => out.per_page = p,
            _ => errors.push("per_page", "Must be greater than or equal to 1."),
        }
    }
    errors.into_result(out)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// `confirmation` flag of the recreate call, `false` when absent.
pub fn parse_recreate_query(params: &HashMap<String, String>) -> Result<bool, FieldErrors> {
    let mut errors = FieldErrors::new(Location::Query);
    let confirmation = match params.get("confirmation") {
        None => false,
        Some(raw) => parse_bool(raw).unwrap_or_else(|| {
            errors.push("confirmation", NOT_A_BOOLEAN);
            false
        }),
    };
    errors.into_result(confirmation)
}

/// List response: one page of records plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePage {
    pub coverages: Vec<Model>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload(value: &str) -> serde_json::Map<String, Value> {
        FIELDS.iter().map(|f| (f.name.to_string(), json!(value))).collect()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn accepts_complete_payload() {
        let body = Value::Object(full_payload("owner"));
        let fields = parse_create_payload(&body).unwrap();
        assert!(fields.missing().is_empty());
        assert_eq!(fields.get("gbg"), Some("owner"));
    }

    #[test]
    fn accepts_empty_strings_and_exact_max_length() {
        let mut body = full_payload("");
        body.insert("gbg".into(), json!("é".repeat(MAX_FIELD_LEN)));
        assert!(parse_create_payload(&Value::Object(body)).is_ok());
    }

    #[test]
    fn names_each_missing_field() {
        for def in FIELDS.iter() {
            let mut body = full_payload("x");
            body.remove(def.name);
            let errors = parse_create_payload(&Value::Object(body)).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get(def.name), Some(&[MISSING_FIELD.to_string()][..]));
        }
    }

    #[test]
    fn collects_all_problems_at_once() {
        let mut body = full_payload("x");
        body.remove("shortname");
        body.insert("gbg".into(), json!(42));
        body.insert("crosstps".into(), Value::Null);
        body.insert("mgexec".into(), json!("y".repeat(MAX_FIELD_LEN + 1)));
        body.insert("cid".into(), json!(7));
        let errors = parse_create_payload(&Value::Object(body)).unwrap_err();
        assert_eq!(errors.location(), Location::Json);
        assert_eq!(errors.get("shortname").unwrap()[0], MISSING_FIELD);
        assert_eq!(errors.get("gbg").unwrap()[0], NOT_A_STRING);
        assert_eq!(errors.get("crosstps").unwrap()[0], NULL_FIELD);
        assert_eq!(errors.get("mgexec").unwrap()[0], "Length must be between 0 and 255.");
        assert_eq!(errors.get("cid").unwrap()[0], UNKNOWN_FIELD);
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn rejects_non_object_body() {
        let errors = parse_create_payload(&json!(["a"])).unwrap_err();
        assert_eq!(errors.get(SCHEMA_KEY).unwrap()[0], INVALID_INPUT);
    }

    #[test]
    fn detail_is_nested_by_location() {
        let mut errors = FieldErrors::new(Location::Query);
        errors.push("per_page", "Must be less than or equal to 255.");
        assert_eq!(
            errors.to_detail(),
            json!({"query": {"per_page": ["Must be less than or equal to 255."]}})
        );
        assert_eq!(errors.to_string(), "query: per_page: Must be less than or equal to 255.");
    }

    #[test]
    fn list_query_defaults() {
        let p = parse_list_query(&HashMap::new()).unwrap();
        assert_eq!(p, Pagination { page: 1, per_page: 20 });
        let p = parse_list_query(&params(&[("page", "3"), ("per_page", "255"), ("other", "x")])).unwrap();
        assert_eq!(p, Pagination { page: 3, per_page: 255 });
    }

    #[test]
    fn list_query_rejects_out_of_range_values() {
        let errors = parse_list_query(&params(&[("per_page", "256")])).unwrap_err();
        assert_eq!(errors.get("per_page").unwrap()[0], "Must be less than or equal to 255.");

        let errors = parse_list_query(&params(&[("per_page", "0"), ("page", "-1")])).unwrap_err();
        assert!(errors.get("per_page").is_some());
        assert!(errors.get("page").is_some());

        let errors = parse_list_query(&params(&[("page", "two")])).unwrap_err();
        assert_eq!(errors.get("page").unwrap()[0], NOT_AN_INTEGER);
    }

    #[test]
    fn recreate_query_parses_booleans() {
        assert!(!parse_recreate_query(&HashMap::new()).unwrap());
        for raw in ["true", "True", "1", "yes", "on"] {
            assert!(parse_recreate_query(&params(&[("confirmation", raw)])).unwrap(), "{raw}");
        }
        for raw in ["false", "0", "no", "off"] {
            assert!(!parse_recreate_query(&params(&[("confirmation", raw)])).unwrap(), "{raw}");
        }
        let errors = parse_recreate_query(&params(&[("confirmation", "maybe")])).unwrap_err();
        assert_eq!(errors.get("confirmation").unwrap()[0], NOT_A_BOOLEAN);
    }
}
