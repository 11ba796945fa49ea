//! REST-backed desktop shortcut persistence.

use platform_host::{
    interpret_response, ApiError, CreateDesktopItemRequest, CreateDesktopItemResponse,
    DeleteDesktopItemResponse, DesktopItemPatch, DesktopItemsFuture, DesktopItemsList,
    DesktopItemsService, UpdateDesktopItemResponse,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::bridge;

/// Default REST mount point of the shell backend.
pub const DEFAULT_API_BASE: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
/// `/api/desktop-items` client; every request carries the session cookie.
pub struct WebDesktopItemsService {
    api_base: String,
}

impl Default for WebDesktopItemsService {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl WebDesktopItemsService {
    /// Creates a client rooted at `api_base` (for example `/api`).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/desktop-items", self.api_base)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/desktop-items/{}", self.api_base, encode_path_segment(id))
    }
}

impl DesktopItemsService for WebDesktopItemsService {
    fn list_items<'a>(&'a self) -> DesktopItemsFuture<'a, Result<DesktopItemsList, ApiError>> {
        Box::pin(async move { send("GET", &self.collection_url(), None::<&()>).await })
    }

    fn create_item<'a>(
        &'a self,
        request: &'a CreateDesktopItemRequest,
    ) -> DesktopItemsFuture<'a, Result<CreateDesktopItemResponse, ApiError>> {
        Box::pin(async move { send("POST", &self.collection_url(), Some(request)).await })
    }

    fn update_item<'a>(
        &'a self,
        id: &'a str,
        patch: &'a DesktopItemPatch,
    ) -> DesktopItemsFuture<'a, Result<UpdateDesktopItemResponse, ApiError>> {
        Box::pin(async move { send("PATCH", &self.item_url(id), Some(patch)).await })
    }

    fn delete_item<'a>(
        &'a self,
        id: &'a str,
    ) -> DesktopItemsFuture<'a, Result<DeleteDesktopItemResponse, ApiError>> {
        Box::pin(async move { send("DELETE", &self.item_url(id), None::<&()>).await })
    }
}

/// Serializes `body`, sends the request, and interprets the response status.
pub(crate) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
    method: &str,
    url: &str,
    body: Option<&B>,
) -> Result<T, ApiError> {
    let body = body
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    let response = bridge::http_request(method, url, body)
        .await
        .map_err(ApiError::Network)?;
    interpret_response(response.status, &response.body)
}

/// Percent-encodes an id for use as one URL path segment.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
