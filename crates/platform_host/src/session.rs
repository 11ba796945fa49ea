//! Account, session, and wallpaper-preference contracts for the cookie-authenticated backend.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Object-safe boxed future used by [`SessionService`].
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Authenticated user summary.
pub struct SessionUser {
    /// Login name shown in the shell.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response of `GET /api/session`.
pub struct SessionInfo {
    /// The signed-in user.
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Body of `POST /api/login`.
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain password; transport security is the backend's concern.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Body of `POST /api/register`.
pub struct RegisterRequest {
    /// Requested login name.
    pub username: String,
    /// Plain password.
    pub password: String,
    /// Contact address.
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Response of `GET /api/background`.
pub struct BackgroundPreference {
    /// Saved wallpaper URL, if the user picked one.
    #[serde(default)]
    pub background_url: Option<String>,
}

/// Cookie-session service.
pub trait SessionService {
    /// Returns the current session, or [`ApiError::Unauthorized`] when signed out.
    fn current_session<'a>(&'a self) -> SessionFuture<'a, Result<SessionInfo, ApiError>>;

    /// Signs in and establishes the session cookie.
    fn login<'a>(&'a self, request: &'a LoginRequest)
        -> SessionFuture<'a, Result<(), ApiError>>;

    /// Creates an account. Does not sign in.
    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>>;

    /// Ends the session.
    fn logout<'a>(&'a self) -> SessionFuture<'a, Result<(), ApiError>>;

    /// Loads the saved wallpaper preference of the session user.
    fn load_background<'a>(&'a self)
        -> SessionFuture<'a, Result<BackgroundPreference, ApiError>>;
}

#[derive(Debug, Default)]
struct MemorySessionState {
    accounts: Vec<LoginRequest>,
    signed_in: Option<String>,
    background_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory session backend with a fixed account list.
pub struct MemorySessionService {
    inner: Rc<RefCell<MemorySessionState>>,
}

impl MemorySessionService {
    /// Creates a backend accepting the given credentials.
    pub fn with_account(username: impl Into<String>, password: impl Into<String>) -> Self {
        let service = Self::default();
        service.inner.borrow_mut().accounts.push(LoginRequest {
            username: username.into(),
            password: password.into(),
        });
        service
    }

    /// Marks `username` as already signed in.
    pub fn sign_in_as(&self, username: impl Into<String>) {
        self.inner.borrow_mut().signed_in = Some(username.into());
    }

    /// Drops the session as if the cookie had expired.
    pub fn expire(&self) {
        self.inner.borrow_mut().signed_in = None;
    }

    /// Sets the saved wallpaper URL.
    pub fn set_background_url(&self, url: Option<String>) {
        self.inner.borrow_mut().background_url = url;
    }

    /// Returns the signed-in username.
    pub fn signed_in_user(&self) -> Option<String> {
        self.inner.borrow().signed_in.clone()
    }
}

impl SessionService for MemorySessionService {
    fn current_session<'a>(&'a self) -> SessionFuture<'a, Result<SessionInfo, ApiError>> {
        Box::pin(async move {
            self.signed_in_user()
                .map(|username| SessionInfo {
                    user: SessionUser { username },
                })
                .ok_or(ApiError::Unauthorized)
        })
    }

    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if !state.accounts.iter().any(|account| account == request) {
                return Err(ApiError::Rejected {
                    status: 401,
                    message: "Invalid username or password".to_string(),
                });
            }
            state.signed_in = Some(request.username.clone());
            Ok(())
        })
    }

    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if state
                .accounts
                .iter()
                .any(|account| account.username == request.username)
            {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "Username already exists".to_string(),
                });
            }
            state.accounts.push(LoginRequest {
                username: request.username.clone(),
                password: request.password.clone(),
            });
            Ok(())
        })
    }

    fn logout<'a>(&'a self) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            self.expire();
            Ok(())
        })
    }

    fn load_background<'a>(
        &'a self,
    ) -> SessionFuture<'a, Result<BackgroundPreference, ApiError>> {
        Box::pin(async move {
            let state = self.inner.borrow();
            if state.signed_in.is_none() {
                return Err(ApiError::Unauthorized);
            }
            Ok(BackgroundPreference {
                background_url: state.background_url.clone(),
            })
        })
    }
}
