//! Session context - the signed-in user's tokens and remembered department.
//!
//! The context is created once at bootstrap and handed to whatever needs it.
//! `logout` clears the credentials; the department choice survives logout so
//! the next sign-in lands on the same dashboard.

use crate::errors::{Error, Result};
use std::{fmt, str::FromStr};
use tracing::info;

/// Environment variable holding the remembered department.
pub const DEPARTMENT_ENV: &str = "SPINE_DEPARTMENT";
/// Environment variable holding the signed-in user's email.
pub const USER_EMAIL_ENV: &str = "SPINE_USER_EMAIL";
/// Environment variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "SPINE_ACCESS_TOKEN";

/// Department whose dashboard a user works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Department {
    /// Finance dashboards and invoicing
    Finance,
    /// Operations dashboards
    Operations,
    /// Trace sheets
    TraceSheets,
}

impl Department {
    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finance => "Finance",
            Self::Operations => "Operations",
            Self::TraceSheets => "Trace Sheets",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finance" => Ok(Self::Finance),
            "operations" => Ok(Self::Operations),
            "trace sheets" | "trace_sheets" | "tracesheets" => Ok(Self::TraceSheets),
            other => Err(Error::Config {
                message: format!("Unknown department '{other}'"),
            }),
        }
    }
}

/// Tokens issued to a signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email of the signed-in user
    pub user_email: String,
    /// Bearer token for backend calls
    pub access_token: String,
    /// Token used to obtain a new access token
    pub refresh_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_email", &self.user_email)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Explicit replacement for ambient browser storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    credentials: Option<Credentials>,
    department: Option<Department>,
}

impl SessionContext {
    /// Creates a signed-out context with an optional remembered department.
    #[must_use]
    pub const fn new(department: Option<Department>) -> Self {
        Self {
            credentials: None,
            department,
        }
    }

    /// Builds a context from environment variables.
    ///
    /// The department is optional but must be valid when set. Credentials are
    /// only installed when both the email and the access token are present.
    pub fn from_env() -> Result<Self> {
        let department = match std::env::var(DEPARTMENT_ENV) {
            Ok(value) => Some(value.parse()?),
            Err(std::env::VarError::NotPresent) => None,
            Err(e) => return Err(e.into()),
        };

        let mut context = Self::new(department);
        if let (Ok(user_email), Ok(access_token)) = (
            std::env::var(USER_EMAIL_ENV),
            std::env::var(ACCESS_TOKEN_ENV),
        ) {
            context.sign_in(Credentials {
                user_email,
                access_token,
                refresh_token: None,
            });
        }
        Ok(context)
    }

    /// Installs credentials after a successful sign-in.
    pub fn sign_in(&mut self, credentials: Credentials) {
        info!("Signed in as {}", credentials.user_email);
        self.credentials = Some(credentials);
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Email of the signed-in user.
    #[must_use]
    pub fn user_email(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.user_email.as_str())
    }

    /// Bearer token of the signed-in user.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.access_token.as_str())
    }

    /// Remembered department.
    #[must_use]
    pub const fn department(&self) -> Option<Department> {
        self.department
    }

    /// Picks a department, preferring an explicit choice (e.g. from a link)
    /// over the remembered one.
    #[must_use]
    pub fn resolve_department(&self, explicit: Option<Department>) -> Option<Department> {
        explicit.or(self.department)
    }

    /// Remembers a department choice.
    pub fn remember_department(&mut self, department: Department) {
        self.department = Some(department);
    }

    /// Forgets the department choice.
    pub fn clear_department(&mut self) {
        self.department = None;
    }

    /// Drops the credentials. The remembered department is kept.
    pub fn logout(&mut self) {
        if let Some(credentials) = self.credentials.take() {
            info!("Logged out {}", credentials.user_email);
        }
    }
}
