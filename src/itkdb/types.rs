//! Shared ITk DB types and record helpers

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as returned by the database: institution, component type, stage, user...
pub type Record = Map<String, Value>;

/// Authenticated identity plus the bearer token used for every command
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: String,
    pub id_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response of the `grantToken` call
#[derive(Debug, Deserialize)]
pub struct GrantTokenResponse {
    pub id_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Claims we read from the `id_token` payload
#[derive(Debug, Deserialize)]
pub struct IdTokenClaims {
    pub uuidentity: String,
}

/// Body of `updateComponentTypeStage`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageUpdate {
    /// Component type id
    pub id: String,
    pub code: String,
    pub name: String,
    /// New 1-based position
    pub order: i64,
}

/// ITk DB endpoints and constants
pub struct ItkdbApi;

impl ItkdbApi {
    pub const AUTH_URL: &'static str = "https://uuidentity.plus4u.net/uu-oidg2-main/0-0/";
    pub const API_URL: &'static str = "https://itkpd-test.unicorncollege.cz/";
    pub const ACCESS_SCOPE: &'static str = "openid https://itkpd-test.unicorncollege.cz";
    pub const GRANT_TOKEN_ENDPOINT: &'static str = "oidc/grantToken";

    pub const GET_USER: &'static str = "getUser";
    pub const LIST_PROJECTS: &'static str = "listProjects";
    pub const LIST_INSTITUTIONS: &'static str = "listInstitutions";
    pub const LIST_COMPONENT_TYPES: &'static str = "listComponentTypes";
    pub const UPDATE_COMPONENT_TYPE_STAGE: &'static str = "updateComponentTypeStage";
}

/// Read a string field, accepting numbers as well
pub fn record_str(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn record_i64(record: &Record, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Display label: `name`, falling back to `code` then `id`
pub fn record_label(record: &Record) -> String {
    ["name", "code", "id"]
        .iter()
        .find_map(|key| record_str(record, key))
        .unwrap_or_else(|| "<unnamed>".to_string())
}

/// Truthiness of a JSON flag the way the database fills them (bool, 0/1, null)
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Ordering used when sorting records by a field.
///
/// Numbers compare numerically and before strings, strings compare lexically,
/// records missing the field go last.
pub fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            Some(Value::Number(_)) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Null) | None => 4,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::MAX);
            let y = y.as_f64().unwrap_or(f64::MAX);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Stable ascending sort by `key`; ties keep input order
pub fn sort_records(records: &mut [Record], key: &str) {
    records.sort_by(|a, b| compare_field(a.get(key), b.get(key)));
}
