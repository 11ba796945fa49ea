//! Desktop shortcut persistence contracts, wire models, and an in-memory backend.
//!
//! The wire models mirror the `/api/desktop-items` REST contract exactly (snake_case field names,
//! `{ items }` list envelope). Decoding is lenient about number-vs-string integers and legacy
//! camelCase aliases because older rows were written by clients that stored either form.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api::ApiError;

/// Object-safe boxed future used by [`DesktopItemsService`] async methods.
pub type DesktopItemsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One persisted desktop shortcut row as returned by `GET /api/desktop-items`.
pub struct DesktopItemRecord {
    /// Server-assigned identifier (number or string on the wire).
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// Owning user; present on some backends, never used by the client.
    #[serde(default, alias = "owner_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Activation target.
    #[serde(default)]
    pub url: String,
    /// Built-in asset path or `data:` URI.
    #[serde(default)]
    pub icon: Option<String>,
    /// Stored image width.
    #[serde(default, alias = "iconWidth", deserialize_with = "lenient_int")]
    pub width: Option<i32>,
    /// Stored image height.
    #[serde(default, alias = "iconHeight", deserialize_with = "lenient_int")]
    pub height: Option<i32>,
    /// Left offset within the desktop surface.
    #[serde(default, alias = "posX", deserialize_with = "lenient_int")]
    pub pos_x: Option<i32>,
    /// Top offset within the desktop surface.
    #[serde(default, alias = "posY", deserialize_with = "lenient_int")]
    pub pos_y: Option<i32>,
    /// Server creation timestamp, used only for ordering.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
/// Envelope returned by `GET /api/desktop-items`.
///
/// Decoding is per row: a row that cannot be decoded (for example one without an id) is left out
/// of `items` and its decode error is kept in `skipped`, so one bad row never hides the others.
pub struct DesktopItemsList {
    /// Rows in server order (oldest first).
    pub items: Vec<DesktopItemRecord>,
    /// Decode errors of rows that were left out.
    #[serde(skip)]
    pub skipped: Vec<String>,
}

impl DesktopItemsList {
    /// Wraps already-decoded rows.
    pub fn from_items(items: Vec<DesktopItemRecord>) -> Self {
        Self {
            items,
            skipped: Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for DesktopItemsList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawList {
            #[serde(default)]
            items: Vec<Value>,
        }

        let raw = RawList::deserialize(deserializer)?;
        let mut list = Self::default();
        for (index, row) in raw.items.into_iter().enumerate() {
            match serde_json::from_value::<DesktopItemRecord>(row) {
                Ok(record) => list.items.push(record),
                Err(err) => list.skipped.push(format!("row {index}: {err}")),
            }
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Body of `POST /api/desktop-items`.
pub struct CreateDesktopItemRequest {
    /// Display label.
    pub name: String,
    /// Normalized activation target.
    pub url: String,
    /// Built-in asset path or `data:` URI.
    pub icon: String,
    /// Initial image width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Initial image height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Initial left offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<i32>,
    /// Initial top offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Body of `PATCH /api/desktop-items/{id}`; only present fields are applied by the backend.
pub struct DesktopItemPatch {
    /// Replacement image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Replacement left offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<i32>,
    /// Replacement top offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<i32>,
    /// Replacement image width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Replacement image height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

impl DesktopItemPatch {
    /// Patch carrying only a position.
    pub fn position(pos_x: i32, pos_y: i32) -> Self {
        Self {
            pos_x: Some(pos_x),
            pos_y: Some(pos_y),
            ..Self::default()
        }
    }

    /// Patch carrying only an image.
    pub fn image(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }

    /// Returns whether the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies present fields onto a record, leaving absent ones untouched.
    pub fn apply_to(&self, record: &mut DesktopItemRecord) -> u32 {
        let mut changes = 0;
        if let Some(icon) = &self.icon {
            record.icon = Some(icon.clone());
            changes += 1;
        }
        if let Some(pos_x) = self.pos_x {
            record.pos_x = Some(pos_x);
            changes += 1;
        }
        if let Some(pos_y) = self.pos_y {
            record.pos_y = Some(pos_y);
            changes += 1;
        }
        if let Some(width) = self.width {
            record.width = Some(width);
            changes += 1;
        }
        if let Some(height) = self.height {
            record.height = Some(height);
            changes += 1;
        }
        changes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response of `POST /api/desktop-items`.
pub struct CreateDesktopItemResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Id assigned to the new row.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Response of `PATCH /api/desktop-items/{id}`.
pub struct UpdateDesktopItemResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Number of changed columns/rows reported by the backend.
    #[serde(default)]
    pub changes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Response of `DELETE /api/desktop-items/{id}`.
pub struct DeleteDesktopItemResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Number of deleted rows.
    #[serde(default)]
    pub deleted: u32,
}

/// Persistence service for the signed-in user's desktop shortcuts.
pub trait DesktopItemsService {
    /// Lists every shortcut of the session user, oldest first.
    fn list_items<'a>(&'a self) -> DesktopItemsFuture<'a, Result<DesktopItemsList, ApiError>>;

    /// Creates a shortcut and returns the server-assigned id.
    fn create_item<'a>(
        &'a self,
        request: &'a CreateDesktopItemRequest,
    ) -> DesktopItemsFuture<'a, Result<CreateDesktopItemResponse, ApiError>>;

    /// Applies a partial update to one shortcut.
    fn update_item<'a>(
        &'a self,
        id: &'a str,
        patch: &'a DesktopItemPatch,
    ) -> DesktopItemsFuture<'a, Result<UpdateDesktopItemResponse, ApiError>>;

    /// Deletes one shortcut.
    fn delete_item<'a>(
        &'a self,
        id: &'a str,
    ) -> DesktopItemsFuture<'a, Result<DeleteDesktopItemResponse, ApiError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Operation selector used for failure injection on [`MemoryDesktopItemsService`].
pub enum DesktopItemsOperation {
    /// `GET /api/desktop-items`.
    List,
    /// `POST /api/desktop-items`.
    Create,
    /// `PATCH /api/desktop-items/{id}`.
    Update,
    /// `DELETE /api/desktop-items/{id}`.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One request observed by [`MemoryDesktopItemsService`].
pub enum DesktopItemsCall {
    /// A list call.
    List,
    /// A create call with its body.
    Create(CreateDesktopItemRequest),
    /// An update call with its id and body.
    Update {
        /// Target id.
        id: String,
        /// Request body.
        patch: DesktopItemPatch,
    },
    /// A delete call with its id.
    Delete {
        /// Target id.
        id: String,
    },
}

#[derive(Debug, Default)]
struct MemoryDesktopItemsState {
    next_id: u64,
    items: Vec<DesktopItemRecord>,
    calls: Vec<DesktopItemsCall>,
    scheduled_failures: HashMap<DesktopItemsOperation, VecDeque<ApiError>>,
    offline: bool,
    session_expired: bool,
}

#[derive(Debug, Clone, Default)]
/// In-memory desktop-items backend scoped to a single signed-in user.
///
/// Every request is recorded before it is answered so tests can assert on the exact calls a flow
/// issued. Failures can be scheduled per operation or forced for every call.
pub struct MemoryDesktopItemsService {
    inner: Rc<RefCell<MemoryDesktopItemsState>>,
}

impl MemoryDesktopItemsService {
    /// Creates a backend pre-populated with `items` in the given order.
    pub fn with_items(items: Vec<DesktopItemRecord>) -> Self {
        let next_id = items
            .iter()
            .filter_map(|item| item.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            inner: Rc::new(RefCell::new(MemoryDesktopItemsState {
                next_id,
                items,
                ..MemoryDesktopItemsState::default()
            })),
        }
    }

    /// Returns a copy of the stored rows.
    pub fn items(&self) -> Vec<DesktopItemRecord> {
        self.inner.borrow().items.clone()
    }

    /// Returns a copy of one stored row.
    pub fn item(&self, id: &str) -> Option<DesktopItemRecord> {
        self.inner
            .borrow()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Returns every request observed so far.
    pub fn calls(&self) -> Vec<DesktopItemsCall> {
        self.inner.borrow().calls.clone()
    }

    /// Forgets recorded requests.
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Makes the next call of `operation` fail with `error` without touching stored rows.
    pub fn fail_next(&self, operation: DesktopItemsOperation, error: ApiError) {
        self.inner
            .borrow_mut()
            .scheduled_failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Makes every call fail with a network error while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// Makes every call answer `401` from now on.
    pub fn expire_session(&self) {
        self.inner.borrow_mut().session_expired = true;
    }

    fn begin(
        &self,
        operation: DesktopItemsOperation,
        call: DesktopItemsCall,
    ) -> Result<(), ApiError> {
        let mut state = self.inner.borrow_mut();
        state.calls.push(call);
        if state.session_expired {
            return Err(ApiError::Unauthorized);
        }
        if state.offline {
            return Err(ApiError::Network("backend unreachable".to_string()));
        }
        if let Some(err) = state
            .scheduled_failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        Ok(())
    }
}

impl DesktopItemsService for MemoryDesktopItemsService {
    fn list_items<'a>(&'a self) -> DesktopItemsFuture<'a, Result<DesktopItemsList, ApiError>> {
        Box::pin(async move {
            self.begin(DesktopItemsOperation::List, DesktopItemsCall::List)?;
            Ok(DesktopItemsList::from_items(self.items()))
        })
    }

    fn create_item<'a>(
        &'a self,
        request: &'a CreateDesktopItemRequest,
    ) -> DesktopItemsFuture<'a, Result<CreateDesktopItemResponse, ApiError>> {
        Box::pin(async move {
            self.begin(
                DesktopItemsOperation::Create,
                DesktopItemsCall::Create(request.clone()),
            )?;
            if request.name.trim().is_empty() || request.url.trim().is_empty() {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "name and url are required".to_string(),
                });
            }
            let mut state = self.inner.borrow_mut();
            state.next_id += 1;
            let id = state.next_id.to_string();
            state.items.push(DesktopItemRecord {
                id: id.clone(),
                user_id: None,
                name: request.name.clone(),
                url: request.url.clone(),
                icon: Some(request.icon.clone()),
                width: request.width,
                height: request.height,
                pos_x: request.pos_x,
                pos_y: request.pos_y,
                created_at: Some(crate::time::next_monotonic_timestamp_ms().to_string()),
            });
            Ok(CreateDesktopItemResponse { success: true, id })
        })
    }

    fn update_item<'a>(
        &'a self,
        id: &'a str,
        patch: &'a DesktopItemPatch,
    ) -> DesktopItemsFuture<'a, Result<UpdateDesktopItemResponse, ApiError>> {
        Box::pin(async move {
            self.begin(
                DesktopItemsOperation::Update,
                DesktopItemsCall::Update {
                    id: id.to_string(),
                    patch: patch.clone(),
                },
            )?;
            if patch.is_empty() {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "no fields to update".to_string(),
                });
            }
            let mut state = self.inner.borrow_mut();
            let changes = state
                .items
                .iter_mut()
                .find(|item| item.id == id)
                .map(|item| patch.apply_to(item))
                .unwrap_or(0);
            Ok(UpdateDesktopItemResponse {
                success: true,
                changes,
            })
        })
    }

    fn delete_item<'a>(
        &'a self,
        id: &'a str,
    ) -> DesktopItemsFuture<'a, Result<DeleteDesktopItemResponse, ApiError>> {
        Box::pin(async move {
            self.begin(
                DesktopItemsOperation::Delete,
                DesktopItemsCall::Delete { id: id.to_string() },
            )?;
            let mut state = self.inner.borrow_mut();
            let before = state.items.len();
            state.items.retain(|item| item.id != id);
            Ok(DeleteDesktopItemResponse {
                success: true,
                deleted: (before - state.items.len()) as u32,
            })
        })
    }
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) if !text.is_empty() => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a number or non-empty string id, found {other}"
        ))),
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_i32))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn value_as_i32(value: &Value) -> Option<i32> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => parse_leading_int(text),
        _ => None,
    }?;
    i32::try_from(parsed).ok()
}

/// Parses the leading integer of `text` the way loosely typed stored values expect
/// (`"48px"` → 48, `" -3"` → -3, `"abc"` → none).
fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(id: &str, name: &str) -> DesktopItemRecord {
        DesktopItemRecord {
            id: id.to_string(),
            user_id: None,
            name: name.to_string(),
            url: format!("https://{name}.example"),
            icon: None,
            width: Some(72),
            height: Some(92),
            pos_x: Some(50),
            pos_y: Some(60),
            created_at: None,
        }
    }

    #[test]
    fn record_decodes_numeric_ids_and_string_integers() {
        let decoded: DesktopItemsList = serde_json::from_value(json!({
            "items": [
                {"id": 7, "user_id": 3, "name": "Docs", "url": "https://docs.rs",
                 "icon": "/icons/website.png", "width": "72", "height": 92,
                 "pos_x": "48px", "pos_y": 12.0, "created_at": "2024-01-01 00:00:00"}
            ]
        }))
        .expect("decode list");

        let item = &decoded.items[0];
        assert_eq!(item.id, "7");
        assert_eq!(item.width, Some(72));
        assert_eq!(item.height, Some(92));
        assert_eq!(item.pos_x, Some(48));
        assert_eq!(item.pos_y, Some(12));
        assert_eq!(item.created_at.as_deref(), Some("2024-01-01 00:00:00"));
    }

    #[test]
    fn record_accepts_camel_case_aliases_and_tolerates_garbage() {
        let item: DesktopItemRecord = serde_json::from_value(json!({
            "id": "abc", "name": "X", "url": "https://x", "posX": 30, "posY": "40",
            "iconWidth": "nope", "height": null
        }))
        .expect("decode");

        assert_eq!(item.pos_x, Some(30));
        assert_eq!(item.pos_y, Some(40));
        assert_eq!(item.width, None);
        assert_eq!(item.height, None);
        assert_eq!(item.icon, None);
    }

    #[test]
    fn record_rejects_missing_id() {
        let result = serde_json::from_value::<DesktopItemRecord>(json!({"name": "X"}));
        assert!(result.is_err());
    }

    #[test]
    fn list_skips_rows_without_an_id_and_keeps_the_rest() {
        let decoded: DesktopItemsList = serde_json::from_value(json!({
            "items": [
                {"id": 1, "name": "Docs", "url": "https://docs.rs"},
                {"name": "Orphan", "url": "https://orphan.example"},
                {"id": "", "name": "Blank", "url": "https://blank.example"},
                {"id": "3", "name": "Crates", "url": "https://crates.io"}
            ]
        }))
        .expect("decode list");

        assert_eq!(
            decoded.items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
        assert_eq!(decoded.skipped.len(), 2);
        assert!(decoded.skipped[0].starts_with("row 1:"));
        assert!(decoded.skipped[1].starts_with("row 2:"));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let value = serde_json::to_value(DesktopItemPatch::position(10, 20)).expect("serialize");
        assert_eq!(value, json!({"pos_x": 10, "pos_y": 20}));

        let value = serde_json::to_value(DesktopItemPatch::image("data:image/png;base64,AA"))
            .expect("serialize");
        assert_eq!(value, json!({"icon": "data:image/png;base64,AA"}));
    }

    #[test]
    fn create_request_omits_absent_geometry() {
        let request = CreateDesktopItemRequest {
            name: "Docs".to_string(),
            url: "https://docs.rs".to_string(),
            icon: "/icons/website.png".to_string(),
            width: None,
            height: None,
            pos_x: Some(12),
            pos_y: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "name": "Docs",
                "url": "https://docs.rs",
                "icon": "/icons/website.png",
                "pos_x": 12
            })
        );
    }

    #[test]
    fn leading_int_parser_matches_loose_storage_values() {
        assert_eq!(parse_leading_int("48px"), Some(48));
        assert_eq!(parse_leading_int(" -3"), Some(-3));
        assert_eq!(parse_leading_int("+9"), Some(9));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn memory_backend_partial_update_keeps_untouched_fields() {
        let backend = MemoryDesktopItemsService::with_items(vec![record("1", "docs")]);

        block_on(backend.update_item(
            "1",
            &DesktopItemPatch {
                width: Some(96),
                height: Some(96),
                ..DesktopItemPatch::default()
            },
        ))
        .expect("resize");

        let stored = backend.item("1").expect("stored");
        assert_eq!(stored.width, Some(96));
        assert_eq!(stored.height, Some(96));
        assert_eq!(stored.pos_x, Some(50));
        assert_eq!(stored.pos_y, Some(60));
    }

    #[test]
    fn memory_backend_assigns_ids_after_seeded_rows_and_keeps_insertion_order() {
        let backend = MemoryDesktopItemsService::with_items(vec![record("4", "docs")]);
        let request = CreateDesktopItemRequest {
            name: "News".to_string(),
            url: "https://news.example".to_string(),
            icon: "/icons/website.png".to_string(),
            width: Some(72),
            height: Some(92),
            pos_x: Some(132),
            pos_y: Some(12),
        };

        let created = block_on(backend.create_item(&request)).expect("create");
        assert_eq!(created.id, "5");

        let listed = block_on(backend.list_items()).expect("list");
        let ids: Vec<_> = listed.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "5"]);
    }

    #[test]
    fn memory_backend_scheduled_failure_leaves_rows_untouched() {
        let backend = MemoryDesktopItemsService::with_items(vec![record("1", "docs")]);
        backend.fail_next(
            DesktopItemsOperation::Delete,
            ApiError::Network("boom".to_string()),
        );

        let err = block_on(backend.delete_item("1")).expect_err("scheduled failure");
        assert_eq!(err, ApiError::Network("boom".to_string()));
        assert!(backend.item("1").is_some());

        block_on(backend.delete_item("1")).expect("second delete succeeds");
        assert!(backend.item("1").is_none());
        assert_eq!(
            backend.calls(),
            vec![
                DesktopItemsCall::Delete { id: "1".to_string() },
                DesktopItemsCall::Delete { id: "1".to_string() },
            ]
        );
    }

    #[test]
    fn memory_backend_expired_session_answers_unauthorized() {
        let backend = MemoryDesktopItemsService::with_items(vec![record("1", "docs")]);
        backend.expire_session();
        assert_eq!(
            block_on(backend.list_items()).expect_err("401"),
            ApiError::Unauthorized
        );
    }
}
