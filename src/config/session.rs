use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SalaryGenError};

/// Dashboard role granted by the authentication service
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Staff,
}

impl Role {
    /// Map a login role flag (`isAdmin`, `isHr`, `isStaff`) to a role
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "isAdmin" => Some(Role::Admin),
            "isHr" => Some(Role::Hr),
            "isStaff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles that may use the administrative report screens
pub const MANAGERS: &[Role] = &[Role::Admin, Role::Hr];

/// Any authenticated user
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Hr, Role::Staff];

/// Logged-in user, persisted in `session.toml`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub display_name: String,
    /// Staff identifier of the user, used by self-service payslips
    #[serde(default)]
    pub staff_id: Option<String>,
}

impl Session {
    /// Fail unless the session role is one of `allowed`
    pub fn require(&self, allowed: &[Role], action: &str) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(SalaryGenError::NotLoggedIn);
        }
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(SalaryGenError::Forbidden {
                role: self.role.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// Whose payslips to show. Staff only ever see their own; managers may
    /// pick anyone and default to themselves.
    pub fn payslip_staff_id(&self, requested: Option<String>) -> Result<String> {
        match self.role {
            Role::Staff => self
                .staff_id
                .clone()
                .ok_or(SalaryGenError::SessionWithoutStaffId),
            Role::Admin | Role::Hr => requested
                .or_else(|| self.staff_id.clone())
                .ok_or(SalaryGenError::MissingStaff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            token: "abc".to_string(),
            role,
            display_name: "Asha".to_string(),
            staff_id: Some("4".to_string()),
        }
    }

    #[test]
    fn role_flags_map_to_roles() {
        assert_eq!(Role::from_flag("isAdmin"), Some(Role::Admin));
        assert_eq!(Role::from_flag("isHr"), Some(Role::Hr));
        assert_eq!(Role::from_flag("isStaff"), Some(Role::Staff));
        assert_eq!(Role::from_flag("isGuest"), None);
    }

    #[test]
    fn staff_cannot_use_manager_screens() {
        let err = session(Role::Staff)
            .require(MANAGERS, "view salary reports")
            .unwrap_err();
        assert!(matches!(err, SalaryGenError::Forbidden { .. }));
        assert!(err.to_string().contains("staff"));
    }

    #[test]
    fn managers_and_staff_pass_their_gates() {
        assert!(session(Role::Hr).require(MANAGERS, "generate salaries").is_ok());
        assert!(session(Role::Staff).require(ANY_ROLE, "view payslips").is_ok());
    }

    #[test]
    fn staff_payslips_always_use_the_session_id() {
        let staff = session(Role::Staff);
        assert_eq!(staff.payslip_staff_id(Some("9".to_string())).unwrap(), "4");

        let hr = session(Role::Hr);
        assert_eq!(hr.payslip_staff_id(Some("9".to_string())).unwrap(), "9");
        assert_eq!(hr.payslip_staff_id(None).unwrap(), "4");
    }

    #[test]
    fn staff_session_without_id_asks_for_a_new_login() {
        let mut staff = session(Role::Staff);
        staff.staff_id = None;
        let err = staff.payslip_staff_id(Some("9".to_string())).unwrap_err();
        assert!(matches!(err, SalaryGenError::SessionWithoutStaffId));
        assert!(!err.to_string().contains("--staff"));
    }

    #[test]
    fn blank_token_is_not_logged_in() {
        let mut s = session(Role::Admin);
        s.token = "  ".to_string();
        assert!(matches!(
            s.require(ANY_ROLE, "view payslips"),
            Err(SalaryGenError::NotLoggedIn)
        ));
    }
}
