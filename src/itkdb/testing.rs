//! Scripted in-memory client used by the unit tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::itkdb::{Authenticator, DatabaseClient, ItkdbError, Record, Session};

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("test record must be an object")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub endpoint: String,
    pub payload: Value,
}

pub struct FakeClient {
    session: Session,
    responses: Mutex<HashMap<String, Vec<Record>>>,
    failing_endpoints: Mutex<HashSet<String>>,
    failing_stage_codes: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            session: Session {
                identity: "1111-2222-3".to_string(),
                id_token: "fake".to_string(),
                expires_at: None,
            },
            responses: Mutex::new(HashMap::new()),
            failing_endpoints: Mutex::new(HashSet::new()),
            failing_stage_codes: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, endpoint: &str, records: Vec<Record>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), records);
        self
    }

    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    /// Posts whose body carries this stage `code` fail
    pub fn fail_stage(&self, code: &str) {
        self.failing_stage_codes
            .lock()
            .unwrap()
            .insert(code.to_string());
    }

    pub fn heal(&self) {
        self.failing_endpoints.lock().unwrap().clear();
        self.failing_stage_codes.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.endpoint == endpoint)
            .collect()
    }

    fn record_call(&self, method: &'static str, endpoint: &str, payload: &Value) {
        self.calls.lock().unwrap().push(Call {
            method,
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
        });
    }
}

#[async_trait]
impl DatabaseClient for FakeClient {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn get(&self, endpoint: &str, params: Value) -> Result<Vec<Record>, ItkdbError> {
        self.record_call("GET", endpoint, &params);
        if self.failing_endpoints.lock().unwrap().contains(endpoint) {
            return Err(ItkdbError::request(endpoint, 500, "scripted failure"));
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or_default())
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Record, ItkdbError> {
        self.record_call("POST", endpoint, &body);
        let code = body.get("code").and_then(Value::as_str).unwrap_or_default();
        if self.failing_endpoints.lock().unwrap().contains(endpoint)
            || self.failing_stage_codes.lock().unwrap().contains(code)
        {
            return Err(ItkdbError::request(endpoint, 400, format!("cannot update {}", code)));
        }
        Ok(body.as_object().cloned().unwrap_or_default())
    }
}

/// Accepts exactly one pair of access codes
pub struct FakeAuthenticator {
    pub code1: String,
    pub code2: String,
    pub client: Arc<FakeClient>,
    pub attempts: Mutex<usize>,
}

impl FakeAuthenticator {
    pub fn new(code1: &str, code2: &str, client: Arc<FakeClient>) -> Self {
        Self {
            code1: code1.to_string(),
            code2: code2.to_string(),
            client,
            attempts: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn authenticate(
        &self,
        access_code1: &str,
        access_code2: &str,
    ) -> Result<Arc<dyn DatabaseClient>, ItkdbError> {
        *self.attempts.lock().unwrap() += 1;
        if access_code1 == self.code1 && access_code2 == self.code2 {
            let client: Arc<dyn DatabaseClient> = self.client.clone();
            Ok(client)
        } else {
            Err(ItkdbError::Authentication("invalid access codes".to_string()))
        }
    }
}
