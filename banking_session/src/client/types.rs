use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::session::{AccountCategory, UserId};

/// Bank user as returned by `/auth/login` and `/usuarios/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "idFiscal", default)]
    pub fiscal_id: Option<String>,
    /// Raw value as sent by the backend; see [`UserProfile::birth_date_parsed`].
    #[serde(rename = "dataNascimento", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "rendaMensal", default)]
    pub monthly_income: Option<Decimal>,
    #[serde(rename = "saldo", default)]
    pub balance: Option<Decimal>,
}

impl UserProfile {
    /// Category implied by the fiscal id, `Unknown` when there is none.
    pub fn account_category(&self) -> AccountCategory {
        self.fiscal_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(AccountCategory::from_fiscal_id)
            .unwrap_or_default()
    }

    /// Birth date as a calendar date. Accepts both `yyyy-MM-dd` and full
    /// ISO timestamps, of which only the date part is kept.
    pub fn birth_date_parsed(&self) -> Option<NaiveDate> {
        let raw = self.birth_date.as_deref()?;
        let date_part = raw.split('T').next()?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// `/auth/login` answers either `{usuario: {...}}` or the profile itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LoginEnvelope {
    Wrapped { usuario: UserProfile },
    Flat(UserProfile),
}

impl LoginEnvelope {
    pub(crate) fn into_profile(self) -> UserProfile {
        match self {
            Self::Wrapped { usuario } => usuario,
            Self::Flat(profile) => profile,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank before the form may be submitted.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }
}

/// Registration form for `POST /usuarios/usuario`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "idFiscal")]
    pub fiscal_id: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "rendaMensal", with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountCreated {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial profile update for `PATCH /usuarios`. Unset fields are left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub id: UserId,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "dataNascimento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(
        rename = "rendaMensal",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub monthly_income: Option<Decimal>,
}

impl ProfileUpdate {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            birth_date: None,
            monthly_income: None,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.birth_date.is_some() || self.monthly_income.is_some()
    }
}

/// Public view of another user, as listed for transfers and history.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "idFiscal", default)]
    pub fiscal_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    #[serde(rename = "idDestinatario")]
    pub recipient_id: UserId,
    #[serde(rename = "valor", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "dataTransacao", default)]
    pub created_at: Option<String>,
    #[serde(rename = "valor")]
    pub amount: Decimal,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "remetente", default)]
    pub sender: Option<UserSummary>,
    #[serde(rename = "destinatario", default)]
    pub recipient: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TransferDirection {
    #[serde(rename = "ENVIADA")]
    Sent,
    #[serde(rename = "RECEBIDA")]
    Received,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "dataTransacao", default)]
    pub created_at: Option<String>,
    #[serde(rename = "valor")]
    pub amount: Decimal,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "tipoTransacao")]
    pub direction: TransferDirection,
    #[serde(rename = "outroUsuario", default)]
    pub counterpart: Option<UserSummary>,
}

/// One page of transaction history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryPage {
    pub content: Vec<HistoryEntry>,
    #[serde(rename = "totalElements", default)]
    pub total_elements: u64,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}
