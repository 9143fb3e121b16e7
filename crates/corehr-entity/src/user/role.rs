//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user role: '{0}'. Expected one of: ADMIN, HR, MANAGER, EMPLOYEE")]
pub struct ParseUserRoleError(pub String);

/// Roles available in the CoreHR access control system.
///
/// ADMIN and HR bypass ownership checks entirely; MANAGER may additionally
/// reach direct and indirect reports; EMPLOYEE is restricted to their own
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Full system administrator.
    Admin,
    /// Human-resources staff; same data reach as Admin, no system config.
    Hr,
    /// May access subordinate employees in addition to their own records.
    Manager,
    /// Regular employee; own records only.
    Employee,
}

impl UserRole {
    /// Whether this role bypasses resource ownership checks.
    pub fn bypasses_ownership(&self) -> bool {
        matches!(self, Self::Admin | Self::Hr)
    }

    /// Return the role as its canonical uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Hr => "HR",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "HR" => Ok(Self::Hr),
            "MANAGER" => Ok(Self::Manager),
            "EMPLOYEE" => Ok(Self::Employee),
            _ => Err(ParseUserRoleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_bypass() {
        assert!(UserRole::Admin.bypasses_ownership());
        assert!(UserRole::Hr.bypasses_ownership());
        assert!(!UserRole::Manager.bypasses_ownership());
        assert!(!UserRole::Employee.bypasses_ownership());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("hr".parse::<UserRole>().unwrap(), UserRole::Hr);
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&UserRole::Employee).unwrap();
        assert_eq!(json, "\"EMPLOYEE\"");
        let role: UserRole = serde_json::from_str("\"HR\"").unwrap();
        assert_eq!(role, UserRole::Hr);
    }
}
