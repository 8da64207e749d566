//! Identity-provider session bound to a single canonical owner key.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use super::api::{ClientResult, TaskApiClient};
use super::transport::HttpTransport;
use crate::http::dto::{TaskRequest, TaskResponse};
use crate::task::domain::{OwnerKey, TaskDomainError, TaskId};

/// The authenticated account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Immutable account id.
    pub id: String,
    /// Current email address; may change over time.
    pub email: Option<String>,
    /// Display name; may change over time.
    pub name: Option<String>,
}

impl Principal {
    /// Creates a principal with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Email and password used to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors reported by an identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Nobody is signed in.
    #[error("no active session")]
    NoSession,

    /// The credential was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The provider could not be reached or failed.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity and session provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the principal of the active session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NoSession`] when nobody is signed in.
    async fn current_principal(&self) -> Result<Principal, IdentityError>;

    /// Opens a session for the credential.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] when the credential is
    /// rejected.
    async fn create_session(&self, credential: &Credential) -> Result<(), IdentityError>;

    /// Closes the active session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the provider fails.
    async fn delete_session(&self) -> Result<(), IdentityError>;
}

/// Errors raised while establishing an [`OwnerSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identity provider failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The principal carries no usable id.
    #[error("principal has no usable id: {0}")]
    InvalidPrincipal(#[from] TaskDomainError),
}

/// A signed-in user's handle on their tasks.
///
/// The owner key is the principal id, resolved once when the session is
/// established and reused for every call. Email and display name are never
/// used as owner keys.
#[derive(Debug)]
pub struct OwnerSession<T> {
    principal: Principal,
    owner: OwnerKey,
    client: TaskApiClient<T>,
}

impl<T> OwnerSession<T>
where
    T: HttpTransport,
{
    /// Binds the provider's active session to `client`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when nobody is signed in or the principal id
    /// is blank.
    pub async fn resume<P>(identity: &P, client: TaskApiClient<T>) -> Result<Self, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let principal = identity.current_principal().await?;
        let owner = OwnerKey::new(principal.id.clone())?;
        tracing::info!(%owner, "task session established");
        Ok(Self {
            principal,
            owner,
            client,
        })
    }

    /// Opens a session with `credential` and binds it to `client`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the credential is rejected or the
    /// principal id is blank.
    pub async fn sign_in<P>(
        identity: &P,
        credential: &Credential,
        client: TaskApiClient<T>,
    ) -> Result<Self, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        identity.create_session(credential).await?;
        Self::resume(identity, client).await
    }

    /// Closes the session and hands the client back.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the provider fails to close the
    /// session.
    pub async fn sign_out<P>(self, identity: &P) -> Result<TaskApiClient<T>, IdentityError>
    where
        P: IdentityProvider + ?Sized,
    {
        identity.delete_session().await?;
        tracing::info!(owner = %self.owner, "task session closed");
        Ok(self.client)
    }

    /// Returns the principal the session was established for.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the canonical owner key.
    #[must_use]
    pub const fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    /// Lists the session owner's tasks.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::list_tasks`].
    pub async fn list_tasks(&self) -> ClientResult<Vec<TaskResponse>> {
        self.client.list_tasks(&self.owner).await
    }

    /// Fetches one of the session owner's tasks.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::get_task`].
    pub async fn get_task(&self, id: TaskId) -> ClientResult<TaskResponse> {
        self.client.get_task(&self.owner, id).await
    }

    /// Creates a task for the session owner.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::create_task`].
    pub async fn create_task(&self, request: &TaskRequest) -> ClientResult<TaskResponse> {
        self.client.create_task(&self.owner, request).await
    }

    /// Replaces a task's fields.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::update_task`].
    pub async fn update_task(&self, id: TaskId, request: &TaskRequest) -> ClientResult<String> {
        self.client.update_task(&self.owner, id, request).await
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::delete_task`].
    pub async fn delete_task(&self, id: TaskId) -> ClientResult<String> {
        self.client.delete_task(&self.owner, id).await
    }

    /// Flips a task between completed and pending.
    ///
    /// # Errors
    ///
    /// See [`TaskApiClient::toggle_task`].
    pub async fn toggle_task(&self, id: TaskId) -> ClientResult<TaskResponse> {
        self.client.toggle_task(&self.owner, id).await
    }
}
