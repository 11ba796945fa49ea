//! Typed host contracts and wire models for the desktop shortcut shell.
//!
//! This crate is the API-first boundary between the desktop runtime and the outside world. It
//! defines the REST wire models and error taxonomy, object-safe service traits for shortcut
//! persistence, the cookie session, external navigation, and the icon image picker, plus in-memory
//! implementations used by tests and the stub host. Browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod desktop_items;
pub mod external_url;
pub mod host;
pub mod icon_image;
pub mod session;
pub mod time;

pub use api::{
    interpret_empty_response, interpret_response, ApiError, STATUS_OK, STATUS_UNAUTHORIZED,
};
pub use desktop_items::{
    CreateDesktopItemRequest, CreateDesktopItemResponse, DeleteDesktopItemResponse,
    DesktopItemPatch, DesktopItemRecord, DesktopItemsCall, DesktopItemsFuture, DesktopItemsList,
    DesktopItemsOperation, DesktopItemsService, MemoryDesktopItemsService,
    UpdateDesktopItemResponse,
};
pub use external_url::{
    ExternalUrlFuture, ExternalUrlService, MemoryExternalUrlService, NoopExternalUrlService,
};
pub use host::{HostServices, HostStrategy, MemoryHost};
pub use icon_image::{
    IconImageError, IconImageFuture, IconImagePicker, MemoryIconImagePicker, NoopIconImagePicker,
    PickedIconImage,
};
pub use session::{
    BackgroundPreference, LoginRequest, MemorySessionService, RegisterRequest, SessionFuture,
    SessionInfo, SessionService, SessionUser,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
