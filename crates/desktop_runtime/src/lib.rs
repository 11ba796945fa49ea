//! Browser desktop shell: shortcut icons, drag and layout, context menus, and the session gate.

pub mod account;
pub mod components;
pub mod config;
pub mod drag;
mod effect_executor;
pub mod host;
pub mod layout;
pub mod model;
pub mod persistence;
pub mod reducer;
mod runtime_context;
pub mod shortcut;

pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use config::icon_config;
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, IconCommand, RuntimeEffect};
