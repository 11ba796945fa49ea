//! Host-bundle model injected into the desktop runtime.

use std::rc::Rc;

use crate::{
    DesktopItemsService, ExternalUrlService, IconImagePicker, MemoryDesktopItemsService,
    MemoryExternalUrlService, MemoryIconImagePicker, MemorySessionService, SessionService,
};

/// Stable host strategy selected for the current build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser adapters talking to the REST backend.
    Browser,
    /// In-memory services; runs the shell without a backend.
    DesktopStub,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::DesktopStub => "desktop-stub",
        }
    }
}

/// Runtime-selected host service bundle injected into the desktop runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `desktop_runtime`, which keeps the runtime decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Shortcut persistence.
    pub desktop_items: Rc<dyn DesktopItemsService>,
    /// Cookie session and saved background.
    pub session: Rc<dyn SessionService>,
    /// Opens shortcut targets.
    pub external_urls: Rc<dyn ExternalUrlService>,
    /// Lets the user choose icon artwork.
    pub icon_images: Rc<dyn IconImagePicker>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

/// Concrete in-memory services behind a [`HostServices`] bundle, kept for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    /// Shortcut backend.
    pub desktop_items: MemoryDesktopItemsService,
    /// Session backend.
    pub session: MemorySessionService,
    /// URL recorder.
    pub external_urls: MemoryExternalUrlService,
    /// Queued image picker.
    pub icon_images: MemoryIconImagePicker,
}

impl MemoryHost {
    /// Wraps the in-memory services into an injectable bundle sharing the same state.
    pub fn services(&self) -> HostServices {
        HostServices {
            desktop_items: Rc::new(self.desktop_items.clone()),
            session: Rc::new(self.session.clone()),
            external_urls: Rc::new(self.external_urls.clone()),
            icon_images: Rc::new(self.icon_images.clone()),
            host_strategy: HostStrategy::DesktopStub,
        }
    }
}
