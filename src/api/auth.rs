use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{decode, Backend};
use crate::config::{Role, Session};
use crate::error::{Result, SalaryGenError};

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";

/// Body returned by the authentication service
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Role flags such as `{"isAdmin": 1, "isHr": 0, "isStaff": 0}`
    #[serde(default)]
    pub role: Map<String, Value>,
    /// Staff identifier of the user, when the service reports it
    #[serde(default)]
    pub id: Option<Value>,
}

impl LoginResponse {
    /// The first role whose flag is set
    pub fn active_role(&self) -> Option<Role> {
        self.role
            .iter()
            .filter(|(_, flag)| is_set(flag))
            .find_map(|(key, _)| Role::from_flag(key))
    }
}

fn is_set(flag: &Value) -> bool {
    match flag {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        Value::String(s) => s.trim() == "1",
        _ => false,
    }
}

/// Authenticate and build the session to persist.
///
/// Blank credentials fail before any request is made.
pub fn login(auth: &dyn Backend, username: &str, password: &str) -> Result<Session> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(SalaryGenError::MissingCredentials);
    }

    let body = json!({ "username": username, "password": password });
    let response: LoginResponse = decode(LOGIN_PATH, auth.post(LOGIN_PATH, Some(&body))?)?;

    let role = response.active_role().ok_or(SalaryGenError::UnexpectedRole)?;
    let staff_id = response.id.as_ref().and_then(|id| match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    });

    info!(username, role = %role, "logged in");

    Ok(Session {
        token: response.token,
        role,
        display_name: response.username.unwrap_or_else(|| username.to_string()),
        staff_id,
    })
}

/// Create a user account on the authentication service.
///
/// The response body is not used; the new user logs in separately.
pub fn register(auth: &dyn Backend, username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(SalaryGenError::MissingCredentials);
    }

    let body = json!({ "username": username, "password": password });
    auth.post(REGISTER_PATH, Some(&body))
        .map_err(|e| SalaryGenError::RegistrationFailed(e.to_string()))?;

    info!(username, "registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::RecordingBackend;
    use serde_json::json;

    #[test]
    fn login_picks_the_flagged_role() {
        let auth = RecordingBackend::default().with(
            "/login",
            json!({
                "token": "jwt",
                "username": "ravi",
                "role": {"isAdmin": 0, "isHr": 1, "isStaff": 0},
                "id": 12
            }),
        );

        let session = login(&auth, "ravi", "secret").unwrap();
        assert_eq!(session.role, Role::Hr);
        assert_eq!(session.token, "jwt");
        assert_eq!(session.display_name, "ravi");
        assert_eq!(session.staff_id.as_deref(), Some("12"));
    }

    #[test]
    fn login_without_any_role_is_rejected() {
        let auth = RecordingBackend::default().with(
            "/login",
            json!({"token": "jwt", "role": {"isAdmin": 0, "isStaff": 0}}),
        );

        assert!(matches!(
            login(&auth, "ravi", "secret"),
            Err(SalaryGenError::UnexpectedRole)
        ));
    }

    #[test]
    fn blank_credentials_skip_the_request() {
        let auth = RecordingBackend::default();
        assert!(matches!(
            login(&auth, " ", "secret"),
            Err(SalaryGenError::MissingCredentials)
        ));
        assert!(auth.calls.borrow().is_empty());
    }

    #[test]
    fn register_posts_the_credentials() {
        let auth = RecordingBackend::default().with("/register", json!({"id": 3}));

        register(&auth, "asha", "pw").unwrap();
        assert_eq!(*auth.calls.borrow(), vec!["POST /register"]);
        assert_eq!(
            auth.bodies.borrow()[0],
            json!({"username": "asha", "password": "pw"})
        );
    }

    #[test]
    fn register_failure_is_reported() {
        let auth = RecordingBackend::default();
        let err = register(&auth, "asha", "pw").unwrap_err();
        assert!(matches!(err, SalaryGenError::RegistrationFailed(_)));
        assert!(err.to_string().starts_with("Registration failed"));

        assert!(matches!(
            register(&auth, "asha", ""),
            Err(SalaryGenError::MissingCredentials)
        ));
        assert_eq!(auth.calls.borrow().len(), 1);
    }
}
