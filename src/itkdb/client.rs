//! ITk production database client
//!
//! The browser only ever talks to the database through [`DatabaseClient`] and
//! [`Authenticator`]. [`HttpClient`] and [`HttpAuthenticator`] implement them
//! against the HTTP/JSON command API.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::itkdb::{
    GrantTokenResponse, IdTokenClaims, ItkdbApi, ItkdbError, Record, Session,
};

/// Authenticated access to the database commands
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Session the client was built from
    fn session(&self) -> &Session;

    /// Run a read command; list commands yield their `itemList`, others a single record
    async fn get(&self, endpoint: &str, params: Value) -> Result<Vec<Record>, ItkdbError>;

    /// Run a write command
    async fn post(&self, endpoint: &str, body: Value) -> Result<Record, ItkdbError>;

    /// Run a read command expected to return exactly one record
    async fn get_one(&self, endpoint: &str, params: Value) -> Result<Record, ItkdbError> {
        self.get(endpoint, params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ItkdbError::request(endpoint, 200, "empty response"))
    }
}

/// Exchanges the two access codes for an authenticated client
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        access_code1: &str,
        access_code2: &str,
    ) -> Result<Arc<dyn DatabaseClient>, ItkdbError>;
}

fn build_http(config: &Config) -> Result<Client, ItkdbError> {
    Ok(Client::builder()
        .user_agent(&config.http.user_agent)
        .timeout(config.http_timeout())
        .build()?)
}

/// Authenticator talking to the identity provider
pub struct HttpAuthenticator {
    config: Config,
    http: Client,
}

impl HttpAuthenticator {
    pub fn new(config: Config) -> Result<Self, ItkdbError> {
        let http = build_http(&config)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        access_code1: &str,
        access_code2: &str,
    ) -> Result<Arc<dyn DatabaseClient>, ItkdbError> {
        if access_code1.is_empty() || access_code2.is_empty() {
            return Err(ItkdbError::Authentication(
                "both access codes are required".to_string(),
            ));
        }

        let url = format!(
            "{}{}",
            self.config.endpoints.auth_url,
            ItkdbApi::GRANT_TOKEN_ENDPOINT
        );
        debug!("Requesting token from: {}", url);

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "grant_type": "password",
                "accessCode1": access_code1,
                "accessCode2": access_code2,
                "scope": self.config.endpoints.access_scope,
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| format!("{} - {}", status, text));
            warn!("Authentication rejected ({}): {}", status, message);
            return Err(ItkdbError::Authentication(message));
        }

        let grant: GrantTokenResponse = serde_json::from_str(&text)?;
        let identity = decode_identity(&grant.id_token)?;
        info!("Authenticated as {}", identity);

        let session = Session {
            identity,
            expires_at: grant
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
            id_token: grant.id_token,
        };

        Ok(Arc::new(HttpClient::new(&self.config, session)?))
    }
}

/// Command client bound to one session
pub struct HttpClient {
    http: Client,
    api_url: String,
    session: Session,
}

impl HttpClient {
    pub fn new(config: &Config, session: Session) -> Result<Self, ItkdbError> {
        Ok(Self {
            http: build_http(config)?,
            api_url: config.endpoints.api_url.clone(),
            session,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_url, endpoint)
    }
}

#[async_trait]
impl DatabaseClient for HttpClient {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn get(&self, endpoint: &str, params: Value) -> Result<Vec<Record>, ItkdbError> {
        debug!("GET {} {}", endpoint, params);
        let response = self
            .http
            .get(self.url(endpoint))
            .bearer_auth(&self.session.id_token)
            .json(&params)
            .send()
            .await?;
        let body = read_response(endpoint, response).await?;
        into_records(endpoint, body)
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Record, ItkdbError> {
        debug!("POST {} {}", endpoint, body);
        let response = self
            .http
            .post(self.url(endpoint))
            .bearer_auth(&self.session.id_token)
            .json(&body)
            .send()
            .await?;
        match read_response(endpoint, response).await? {
            Value::Object(record) => Ok(record),
            Value::Null => Ok(Record::new()),
            other => Err(ItkdbError::request(
                endpoint,
                200,
                format!("unexpected response: {}", other),
            )),
        }
    }
}

async fn read_response(endpoint: &str, response: Response) -> Result<Value, ItkdbError> {
    let status = response.status();
    let text = response.text().await?;
    let body: Option<Value> = if text.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str(&text).ok()
    };

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| text.clone());
        return Err(ItkdbError::request(endpoint, status.as_u16(), message));
    }

    let body = match body {
        Some(body) => body,
        None => serde_json::from_str(&text)?,
    };
    if let Some(message) = error_message(&body) {
        return Err(ItkdbError::request(endpoint, status.as_u16(), message));
    }
    Ok(body)
}

/// Collect the error entries of `uuAppErrorMap`, ignoring warnings
pub(crate) fn error_message(body: &Value) -> Option<String> {
    let errors = body.get("uuAppErrorMap")?.as_object()?;
    let messages: Vec<String> = errors
        .iter()
        .filter(|(_, entry)| {
            entry
                .get("type")
                .and_then(Value::as_str)
                .map(|kind| kind == "error")
                .unwrap_or(true)
        })
        .map(|(code, entry)| match entry.get("message").and_then(Value::as_str) {
            Some(message) => format!("{}: {}", code, message),
            None => code.clone(),
        })
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

/// Unwrap `itemList` for list commands, wrap single records
pub(crate) fn into_records(endpoint: &str, body: Value) -> Result<Vec<Record>, ItkdbError> {
    match body {
        Value::Object(mut object) => match object.remove("itemList") {
            Some(Value::Array(items)) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect()),
            Some(other) => {
                object.insert("itemList".to_string(), other);
                Ok(vec![object])
            }
            None => Ok(vec![object]),
        },
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(ItkdbError::request(
            endpoint,
            200,
            format!("unexpected response: {}", other),
        )),
    }
}

/// Read the `uuidentity` claim out of a JWT without verifying it
pub(crate) fn decode_identity(id_token: &str) -> Result<String, ItkdbError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ItkdbError::Token("token is not a JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ItkdbError::Token(e.to_string()))?;
    let claims: IdTokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| ItkdbError::Token(e.to_string()))?;
    Ok(claims.uuidentity)
}
