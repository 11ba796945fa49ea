//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate wires the desktop shell to the browser: a credentialed `fetch` client for the
//! shortcut and session REST endpoints, `window.open` for shortcut targets, and a hidden file
//! input for icon artwork. All JS interop sits in the private `bridge` module, which falls back to
//! "unsupported" errors on native targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod desktop_items;
pub mod external_url;
pub mod icon_image;
pub mod session;

pub use adapters::{
    build_host_services, desktop_items_service, external_url_service, host_strategy_name,
    icon_image_picker, selected_host_strategy, session_service, DesktopItemsServiceAdapter,
    ExternalUrlServiceAdapter, IconImagePickerAdapter, SessionServiceAdapter,
};
pub use desktop_items::{WebDesktopItemsService, DEFAULT_API_BASE};
pub use external_url::WebExternalUrlService;
pub use icon_image::WebIconImagePicker;
pub use session::WebSessionService;
