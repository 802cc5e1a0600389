//! banking-session - Session and authentication lifecycle for a digital-banking client
//!
//! This crate keeps a client-side session in sync with a cookie-authenticated
//! banking REST backend. It reconciles a locally persisted identity with the
//! backend on startup, publishes session snapshots to subscribers, and
//! provides route guards and typed calls for the rest of the banking API.

mod client;
mod config;
mod guards;
mod identity;
mod session;

#[cfg(test)]
mod test_utils;

pub use client::{
    AccountCreated, ApiClient, ApiFailure, ApiResult, HistoryEntry, HistoryPage, LoginCredentials,
    NewAccount, ProfileUpdate, SessionBackend, TransferDirection, TransferReceipt,
    TransferRequest, UserProfile, UserSummary,
};

pub use config::{
    BANK_API_BASE_URL, BANK_API_TIMEOUT_SECS, BANK_ROUTE_HOME, BANK_ROUTE_LOGIN,
    BANK_VERIFY_TIMEOUT_SECS, ConfigError, RouteTargets, SessionConfig,
};

pub use guards::{
    GuardDecision, Redirect, RoutePolicy, require_anonymous, require_authenticated,
    wait_for_decision,
};

pub use identity::{
    BANK_IDENTITY_STORE_PATH, BANK_IDENTITY_STORE_TYPE, FileIdentityStore, IdentityStore,
    IdentityStoreError, InMemoryIdentityStore, identity_store_from_env, open_identity_store,
};

pub use session::{AccountCategory, Session, SessionError, SessionManager, SessionStatus, UserId};
