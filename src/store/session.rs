// SPDX-License-Identifier: MIT

//! Session store - authentication identity and its durable mirror

use super::model::{AuthPayload, LoginInput, RegisterInput, User, UserPatch};
use super::navigation::{Navigator, LOGIN_ROUTE};
use super::storage::Storage;
use super::{read, write, BusyFlag};
use crate::gql::error::{ClientError, Result};
use crate::gql::{extract, GraphQlRequest, Operation, Transport};
use serde_json::json;
use std::sync::{Arc, RwLock};

/// Durable storage key holding the raw bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Durable storage key holding the JSON-serialized user
pub const AUTH_USER_KEY: &str = "auth_user";

/// Holds the signed-in identity and keeps durable storage in step with it
///
/// Token and user are stored together, so one is never present without
/// the other. Without a `Storage` the store is memory-only.
pub struct SessionStore {
    transport: Arc<dyn Transport>,
    storage: Option<Arc<dyn Storage>>,
    navigator: Arc<dyn Navigator>,
    auth: RwLock<Option<AuthPayload>>,
    loading: BusyFlag,
}

impl SessionStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Option<Arc<dyn Storage>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            storage,
            navigator,
            auth: RwLock::new(None),
            loading: BusyFlag::default(),
        }
    }

    pub fn user(&self) -> Option<User> {
        read(&self.auth).as_ref().map(|a| a.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        read(&self.auth).as_ref().map(|a| a.user.id.clone())
    }

    pub fn token(&self) -> Option<String> {
        read(&self.auth).as_ref().map(|a| a.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        read(&self.auth)
            .as_ref()
            .is_some_and(|a| !a.token.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Sign in and commit the returned session
    ///
    /// On failure the current session is left as it was and the error is
    /// returned to the caller.
    pub async fn login(&self, credentials: LoginInput) -> Result<()> {
        let request = Operation::Login.request(json!({ "loginInput": credentials }));
        self.authenticate(request).await
    }

    /// Create an account and commit the returned session
    pub async fn register(&self, profile: RegisterInput) -> Result<()> {
        let request = Operation::Register.request(json!({ "registerInput": profile }));
        self.authenticate(request).await
    }

    async fn authenticate(&self, request: GraphQlRequest) -> Result<()> {
        let _busy = self.loading.enter();
        let operation = request.operation;

        let payload = match self.fetch_payload(request).await {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("{} error: {}", operation.name(), e);
                return Err(e);
            }
        };

        self.commit_auth(payload);
        Ok(())
    }

    async fn fetch_payload(&self, request: GraphQlRequest) -> Result<AuthPayload> {
        let operation = request.operation;
        let data = self.transport.execute(request).await?;
        extract::<AuthPayload>(&data, operation)?
            .ok_or_else(|| ClientError::missing_result(operation.field()))
    }

    /// Replace the current session and write it to durable storage
    pub fn commit_auth(&self, payload: AuthPayload) {
        if let Some(storage) = &self.storage {
            persist(storage.as_ref(), AUTH_TOKEN_KEY, &payload.token);
            persist_user(storage.as_ref(), &payload.user);
        }
        *write(&self.auth) = Some(payload);
    }

    /// Reload the session persisted by an earlier process
    ///
    /// Returns `true` when a session was restored. Missing keys leave the
    /// store signed out; unreadable or unparsable data forces a logout.
    pub fn restore_auth(&self) -> bool {
        let Some(storage) = &self.storage else {
            return false;
        };

        let stored = storage
            .get(AUTH_TOKEN_KEY)
            .and_then(|token| Ok((token, storage.get(AUTH_USER_KEY)?)));

        let (token, user) = match stored {
            Ok((Some(token), Some(user))) if !token.is_empty() && !user.is_empty() => {
                (token, user)
            }
            Ok(_) => return false,
            Err(e) => {
                log::error!("Error reading saved session: {}", e);
                self.logout();
                return false;
            }
        };

        match serde_json::from_str::<User>(&user) {
            Ok(user) => {
                *write(&self.auth) = Some(AuthPayload { token, user });
                true
            }
            Err(e) => {
                log::error!("Error parsing saved user data: {}", e);
                self.logout();
                false
            }
        }
    }

    /// Drop the session from memory and durable storage, then go to the login view
    pub fn logout(&self) {
        *write(&self.auth) = None;

        if let Some(storage) = &self.storage {
            for key in [AUTH_TOKEN_KEY, AUTH_USER_KEY] {
                if let Err(e) = storage.remove(key) {
                    log::warn!("Failed to remove '{}' from storage: {}", key, e);
                }
            }
        }

        self.navigator.navigate(LOGIN_ROUTE);
    }

    /// Merge profile changes into the current user; no-op when signed out
    pub fn update_identity(&self, patch: UserPatch) {
        let mut auth = write(&self.auth);
        let Some(current) = auth.as_mut() else {
            return;
        };
        current.user.apply(patch);

        if let Some(storage) = &self.storage {
            persist_user(storage.as_ref(), &current.user);
        }
    }
}

// Durable writes are best-effort: a failure is logged, memory state still wins.
fn persist(storage: &dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        log::warn!("Failed to persist '{}': {}", key, e);
    }
}

fn persist_user(storage: &dyn Storage, user: &User) {
    match serde_json::to_string(user) {
        Ok(json) => persist(storage, AUTH_USER_KEY, &json),
        Err(e) => log::warn!("Failed to serialize user: {}", e),
    }
}
