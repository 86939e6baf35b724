mod auth;

pub use auth::{login, register, LoginResponse};

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::config::ApiSettings;
use crate::error::{Result, SalaryGenError};

/// Staff directory
pub const STAFF_PATH: &str = "/api/staff";
/// All salary transactions
pub const TRANSACTIONS_PATH: &str = "/api/salary-transactions";
/// Audit log entries
pub const AUDIT_LOGS_PATH: &str = "/api/audit-logs";
/// Salary component definitions (allowances and deductions)
pub const COMPONENTS_PATH: &str = "/api/salary-components";

/// Path of a single staff record
pub fn staff_detail_path(staff_id: &str) -> Result<String> {
    Ok(format!("{STAFF_PATH}/{}", path_segment(staff_id)?))
}

/// Check that an id can be spliced into a URL path as one segment
pub fn path_segment(id: &str) -> Result<&str> {
    let id = id.trim();
    let splits = id.chars().any(|c| {
        matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
    });
    if id.is_empty() || id == "." || id == ".." || splits {
        return Err(SalaryGenError::InvalidId(id.to_string()));
    }
    Ok(id)
}

/// The JSON endpoints the reporting pipeline reads from.
///
/// Every call is a single blocking request; there are no retries.
pub trait Backend {
    fn get(&self, path: &str) -> Result<Value>;
    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value>;
    fn put(&self, path: &str, body: &Value) -> Result<Value>;
    fn delete(&self, path: &str) -> Result<Value>;
}

/// `Backend` over HTTP with an optional bearer token
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64, token: Option<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Backend for the payroll API described by `settings`
    pub fn from_settings(settings: &ApiSettings, token: Option<String>) -> Self {
        Self::new(&settings.base_url, settings.timeout_secs, token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(
        &self,
        path: &str,
        request: RequestBuilder<WithBody>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let sent = match body {
            Some(json) => request
                .header("Content-Type", "application/json")
                .send(json.to_string()),
            None => request.send_empty(),
        };

        let body = sent
            .and_then(|mut response| response.body_mut().read_to_string())
            .map_err(|e| request_failed(path, e))?;

        parse_body(path, &body)
    }

    fn call(&self, path: &str, request: RequestBuilder<WithoutBody>) -> Result<Value> {
        let body = request
            .call()
            .and_then(|mut response| response.body_mut().read_to_string())
            .map_err(|e| request_failed(path, e))?;

        parse_body(path, &body)
    }
}

impl Backend for HttpBackend {
    fn get(&self, path: &str) -> Result<Value> {
        debug!(path, "GET");
        self.call(path, self.authorized(self.agent.get(&self.url(path))))
    }

    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        debug!(path, "POST");
        self.send(path, self.authorized(self.agent.post(&self.url(path))), body)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value> {
        debug!(path, "PUT");
        self.send(path, self.authorized(self.agent.put(&self.url(path))), Some(body))
    }

    fn delete(&self, path: &str) -> Result<Value> {
        debug!(path, "DELETE");
        self.call(path, self.authorized(self.agent.delete(&self.url(path))))
    }
}

fn request_failed(path: &str, err: ureq::Error) -> SalaryGenError {
    error!(path, error = %err, "request failed");
    match err {
        ureq::Error::StatusCode(status) => SalaryGenError::Status {
            status,
            path: path.to_string(),
        },
        other => SalaryGenError::Http {
            path: path.to_string(),
            message: other.to_string(),
        },
    }
}

/// An empty body is treated as JSON `null`
fn parse_body(path: &str, body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| SalaryGenError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Coerce a response into a list: arrays pass through, a single object becomes
/// a one-element list and `null` becomes an empty list.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Decode each list element into `T`
pub fn decode_list<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<Vec<T>> {
    into_list(value)
        .into_iter()
        .map(|item| decode(path, item))
        .collect()
}

/// Decode one JSON value into `T`
pub fn decode<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SalaryGenError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned responses by path and records every request made
    #[derive(Default)]
    pub struct RecordingBackend {
        responses: HashMap<String, Value>,
        pub calls: RefCell<Vec<String>>,
        /// JSON bodies sent with POST and PUT, in order
        pub bodies: RefCell<Vec<Value>>,
    }

    impl RecordingBackend {
        pub fn with(mut self, path: &str, response: Value) -> Self {
            self.responses.insert(path.to_string(), response);
            self
        }

        fn respond(&self, method: &str, path: &str) -> Result<Value> {
            self.calls.borrow_mut().push(format!("{method} {path}"));
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| SalaryGenError::Status {
                    status: 404,
                    path: path.to_string(),
                })
        }
    }

    impl Backend for RecordingBackend {
        fn get(&self, path: &str) -> Result<Value> {
            self.respond("GET", path)
        }

        fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
            if let Some(body) = body {
                self.bodies.borrow_mut().push(body.clone());
            }
            self.respond("POST", path)
        }

        fn put(&self, path: &str, body: &Value) -> Result<Value> {
            self.bodies.borrow_mut().push(body.clone());
            self.respond("PUT", path)
        }

        fn delete(&self, path: &str) -> Result<Value> {
            self.respond("DELETE", path)
        }
    }
}
