// SPDX-License-Identifier: MIT

//! OAuth credential lifecycle for the sensor API.
//!
//! Handles:
//! - Cached access token with a proactive refresh margin
//! - Single-flight renewal (concurrent callers await the in-flight attempt)
//! - Refresh token rotation on providers that issue a replacement
//! - All-or-nothing credential updates: a failed renewal mutates nothing

use crate::error::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Margin before token expiration when we proactively renew (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// The rotating OAuth credential. Mutated only by [`TokenManager`].
#[derive(Debug, Clone)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    /// Must never be discarded without a successful write of its
    /// replacement — losing it is unrecoverable without re-authorization.
    pub refresh_token: String,
    pub access_token: Option<String>,
    pub access_token_expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential seeded from stored secrets, with no access token yet.
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            access_token: None,
            access_token_expiry: None,
        }
    }

    fn valid_access_token(&self, now: DateTime<Utc>) -> Option<String> {
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        match (&self.access_token, self.access_token_expiry) {
            (Some(token), Some(expiry)) if now + margin < expiry => Some(token.clone()),
            _ => None,
        }
    }
}

/// Successful response from the token-renewal endpoint.
#[derive(Debug, Clone)]
pub struct RenewedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Present when the provider rotated the refresh token.
    pub refresh_token: Option<String>,
}

/// Token-renewal capability, implemented by the sensor API client.
#[async_trait]
pub trait TokenRenew: Send + Sync {
    async fn renew_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<RenewedToken, AuthError>;
}

/// Owns the credential and the only code path that talks to the token
/// endpoint.
pub struct TokenManager {
    renewer: Arc<dyn TokenRenew>,
    /// Guards reads and the atomic replace; held only for in-memory work.
    credential: Mutex<Credential>,
    /// Serializes renewal attempts. Held across the network call so that
    /// concurrent callers await the in-flight renewal instead of issuing
    /// duplicates (duplicates can invalidate a single-use refresh token).
    renewal_lock: tokio::sync::Mutex<()>,
    /// Timestamp of the most recent failed renewal. Callers whose `now` is
    /// not past it inherit that failure instead of re-issuing the call.
    last_failed_renewal: Mutex<Option<DateTime<Utc>>>,
}

impl TokenManager {
    pub fn new(credential: Credential, renewer: Arc<dyn TokenRenew>) -> Self {
        Self {
            renewer,
            credential: Mutex::new(credential),
            renewal_lock: tokio::sync::Mutex::new(()),
            last_failed_renewal: Mutex::new(None),
        }
    }

    /// Get an access token valid at `now` (plus the refresh margin).
    ///
    /// Fast path: the cached token is still valid and is returned without
    /// any I/O. Slow path: one renewal call, serialized across callers.
    /// Renewal failures are not retried here; the caller decides whether to
    /// keep serving the last good snapshot.
    pub async fn get_valid_access_token(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        if let Some(token) = self.lock_credential().valid_access_token(now) {
            return Ok(token);
        }

        let _guard = self.renewal_lock.lock().await;

        // Re-check after acquiring the lock: another caller may have
        // renewed (or failed to renew) while we were waiting.
        let (client_id, client_secret, refresh_token) = {
            let cred = self.lock_credential();
            if let Some(token) = cred.valid_access_token(now) {
                return Ok(token);
            }
            if matches!(self.last_failure(), Some(failed_at) if failed_at >= now) {
                // The renewal we were awaiting failed; inherit that result
                // rather than retrying within the same cycle.
                return Err(AuthError::ExpiredOrRevoked);
            }
            (
                cred.client_id.clone(),
                cred.client_secret.clone(),
                cred.refresh_token.clone(),
            )
        };

        tracing::info!("access token missing or expiring, renewing");
        let renewed = match self
            .renewer
            .renew_token(&client_id, &client_secret, &refresh_token)
            .await
        {
            Ok(renewed) => renewed,
            Err(e) => {
                *self.lock_failure() = Some(now);
                return Err(e);
            }
        };

        // Atomic replace: access token, expiry, and (when rotated) the
        // refresh token change together or not at all.
        {
            let mut cred = self.lock_credential();
            cred.access_token = Some(renewed.access_token.clone());
            cred.access_token_expiry = Some(renewed.expires_at);
            if let Some(rotated) = renewed.refresh_token {
                cred.refresh_token = rotated;
            }
        }

        tracing::info!(expires_at = %renewed.expires_at, "access token renewed");
        Ok(renewed.access_token)
    }

    /// Snapshot of the credential, for host-side persistence of a rotated
    /// refresh token.
    pub fn credential(&self) -> Credential {
        self.lock_credential().clone()
    }

    fn lock_credential(&self) -> std::sync::MutexGuard<'_, Credential> {
        // The credential mutex is held only for field access; a poisoned
        // lock means a panic mid-read, which cannot leave a torn credential.
        match self.credential.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn last_failure(&self) -> Option<DateTime<Utc>> {
        *self.lock_failure()
    }

    fn lock_failure(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        match self.last_failed_renewal.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
