use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of digits in an individual's fiscal identifier (CPF).
const INDIVIDUAL_FISCAL_ID_DIGITS: usize = 11;

/// Opaque identifier of a bank user.
///
/// The backend sends numeric ids while the identity store keeps strings, so
/// this accepts either on the wire and serializes back as a number whenever
/// the id is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Authentication phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Uninitialized,
    Verifying,
    Authenticated,
    Anonymous,
}

impl SessionStatus {
    /// True once the initial verification pass has produced a final answer.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Authenticated | Self::Anonymous)
    }
}

/// Individual vs. organization account, derived from the fiscal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    #[default]
    Unknown,
    Individual,
    Organization,
}

impl AccountCategory {
    /// Classifies an account by the digit count of its fiscal identifier.
    ///
    /// Non-digit characters (dots, dashes, slashes of formatted CPF/CNPJ
    /// numbers) are ignored. Exactly 11 digits is an individual; every other
    /// length is an organization.
    pub fn from_fiscal_id(fiscal_id: &str) -> Self {
        let digits = fiscal_id.chars().filter(|c| c.is_ascii_digit()).count();
        if digits == INDIVIDUAL_FISCAL_ID_DIGITS {
            Self::Individual
        } else {
            Self::Organization
        }
    }

    /// Tag written to the identity store, `None` for `Unknown`.
    pub fn as_tag(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Individual => Some("individual"),
            Self::Organization => Some("organization"),
        }
    }

    /// Parses a stored tag. Unrecognized tags read back as `Unknown` so a
    /// corrupted cache entry only forces a profile refetch.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "individual" => Self::Individual,
            "organization" => Self::Organization,
            _ => Self::Unknown,
        }
    }
}

/// Snapshot of the session published to subscribers.
///
/// Fields are private so that `user_id` is present exactly when the status is
/// `Authenticated`, and a known category only ever accompanies an
/// authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    status: SessionStatus,
    user_id: Option<UserId>,
    account_category: AccountCategory,
}

impl Session {
    pub fn uninitialized() -> Self {
        Self::without_user(SessionStatus::Uninitialized)
    }

    pub fn verifying() -> Self {
        Self::without_user(SessionStatus::Verifying)
    }

    pub fn anonymous() -> Self {
        Self::without_user(SessionStatus::Anonymous)
    }

    pub fn authenticated(user_id: UserId, account_category: AccountCategory) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user_id: Some(user_id),
            account_category,
        }
    }

    fn without_user(status: SessionStatus) -> Self {
        Self {
            status,
            user_id: None,
            account_category: AccountCategory::Unknown,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn account_category(&self) -> AccountCategory {
        self.account_category
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::uninitialized()
    }
}
