//! Strongly-typed domain structures for application settings.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Deployment mode selected through `GOBLOG_ENV`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    /// Parse the exact mode name. Matching is case-sensitive.
    pub fn try_from_str(value: &str) -> Result<Self, TypeConstraintError> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(TypeConstraintError::InvalidEnvironmentMode(
                other.to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for AppEnv {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(s)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parses_known_modes() {
        assert_eq!(
            AppEnv::try_from_str("development").unwrap(),
            AppEnv::Development
        );
        assert_eq!(
            "production".parse::<AppEnv>().unwrap(),
            AppEnv::Production
        );
    }

    #[test]
    fn app_env_rejects_unknown_and_miscased() {
        for raw in ["staging", "Production", "", " development"] {
            let err = AppEnv::try_from_str(raw).unwrap_err();
            assert!(matches!(err, TypeConstraintError::InvalidEnvironmentMode(ref v) if v == raw));
        }
    }

    #[test]
    fn app_env_display_matches_name() {
        assert_eq!(AppEnv::Production.to_string(), "production");
        assert_eq!(AppEnv::default().as_str(), "development");
        assert!(AppEnv::Production.is_production());
        assert!(!AppEnv::Development.is_production());
    }
}

/// Raised when a raw value does not fit its domain type.
#[derive(Debug, Error)]
pub enum TypeConstraintError {
    #[error("invalid environment mode {0:?}")]
    InvalidEnvironmentMode(String),
}
