//! Account-side storage of the coarse accessibility profile.
use crate::profile::AccessibilityProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authenticated account, as handed over by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: String,
    pub access_token: String,
}

impl Session {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            access_token: access_token.into(),
        }
    }
}

/// One profile row per account, keyed by account id.
#[async_trait(?Send)]
pub trait RemoteProfileStore {
    type Error: std::error::Error + 'static;

    /// Point read of the account's profile column; `None` when the column is null.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the query.
    async fn select_profile(
        &self,
        session: &Session,
    ) -> Result<Option<AccessibilityProfile>, Self::Error>;

    /// Point update of the account's profile column.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the update.
    async fn update_profile(
        &self,
        session: &Session,
        profile: AccessibilityProfile,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("no active session")]
    NoSession,
    #[error("remote profile store failed: {0}")]
    Remote(String),
}

/// Read the account profile, mapping every failure to `None`.
pub async fn fetch_account_profile<R: RemoteProfileStore + ?Sized>(
    remote: &R,
    session: Option<&Session>,
) -> Option<AccessibilityProfile> {
    let session = session?;
    match remote.select_profile(session).await {
        Ok(profile) => Some(profile.unwrap_or_default()),
        Err(err) => {
            log::error!("error loading accessibility profile: {err}");
            None
        }
    }
}

/// Write the account profile. Fire-and-forget: no retry.
///
/// # Errors
///
/// Returns [`SyncError::NoSession`] without a session and
/// [`SyncError::Remote`] when the backend fails.
pub async fn push_account_profile<R: RemoteProfileStore + ?Sized>(
    remote: &R,
    session: Option<&Session>,
    profile: AccessibilityProfile,
) -> Result<(), SyncError> {
    let session = session.ok_or(SyncError::NoSession)?;
    remote.update_profile(session, profile).await.map_err(|err| {
        log::error!("error saving accessibility profile: {err}");
        SyncError::Remote(err.to_string())
    })
}

/// Local preference that disagrees with the account value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConflict {
    pub local: AccessibilityProfile,
    pub account: AccessibilityProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictChoice {
    KeepLocal,
    UseAccount,
}

/// Outcome of comparing device and account profiles after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    NoSession,
    /// The account could not be read; local state stays authoritative.
    Unavailable,
    /// Nothing stored locally, the account value was applied.
    Adopted(AccessibilityProfile),
    InSync(AccessibilityProfile),
    /// Both exist and differ; nothing applied until the user picks one.
    Conflict(ProfileConflict),
}

/// Decide what sign-in should do with the two profile sources.
#[must_use]
pub fn reconcile(
    local: Option<AccessibilityProfile>,
    account: AccessibilityProfile,
) -> Reconciliation {
    match local {
        None => Reconciliation::Adopted(account),
        Some(local) if local == account => Reconciliation::InSync(account),
        Some(local) => Reconciliation::Conflict(ProfileConflict { local, account }),
    }
}
