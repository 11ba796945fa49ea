//! Cookie-session client for the `/api/session`, `/api/login`, `/api/register`, `/api/logout`,
//! and `/api/background` endpoints.

use platform_host::{
    interpret_empty_response, ApiError, BackgroundPreference, LoginRequest, RegisterRequest,
    SessionFuture, SessionInfo, SessionService, STATUS_UNAUTHORIZED,
};

use crate::{
    bridge::{self, HttpResponse},
    desktop_items::{send, DEFAULT_API_BASE},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Browser session service.
pub struct WebSessionService {
    api_base: String,
}

impl Default for WebSessionService {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl WebSessionService {
    /// Creates a client rooted at `api_base`.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    async fn post(&self, path: &str, body: Option<String>) -> Result<HttpResponse, ApiError> {
        bridge::http_request("POST", &self.url(path), body)
            .await
            .map_err(ApiError::Network)
    }
}

impl SessionService for WebSessionService {
    fn current_session<'a>(&'a self) -> SessionFuture<'a, Result<SessionInfo, ApiError>> {
        Box::pin(async move { send("GET", &self.url("session"), None::<&()>).await })
    }

    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let body =
                serde_json::to_string(request).map_err(|e| ApiError::Decode(e.to_string()))?;
            let response = self.post("login", Some(body)).await?;
            // Bad credentials come back as 401 with an `{error}` body, not an expired session.
            if response.status == STATUS_UNAUTHORIZED {
                return Err(ApiError::Rejected {
                    status: STATUS_UNAUTHORIZED,
                    message: login_error_message(&response.body),
                });
            }
            interpret_empty_response(response.status, &response.body)
        })
    }

    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let body =
                serde_json::to_string(request).map_err(|e| ApiError::Decode(e.to_string()))?;
            let response = self.post("register", Some(body)).await?;
            interpret_empty_response(response.status, &response.body)
        })
    }

    fn logout<'a>(&'a self) -> SessionFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let response = self.post("logout", None).await?;
            interpret_empty_response(response.status, &response.body)
        })
    }

    fn load_background<'a>(
        &'a self,
    ) -> SessionFuture<'a, Result<BackgroundPreference, ApiError>> {
        Box::pin(async move { send("GET", &self.url("background"), None::<&()>).await })
    }
}

fn login_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| "Invalid username or password".to_string())
}
