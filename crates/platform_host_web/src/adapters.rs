use std::rc::Rc;

use platform_host::{
    ApiError, BackgroundPreference, CreateDesktopItemRequest, CreateDesktopItemResponse,
    DeleteDesktopItemResponse, DesktopItemPatch, DesktopItemRecord, DesktopItemsFuture,
    DesktopItemsList, DesktopItemsService, ExternalUrlFuture, ExternalUrlService, HostServices,
    HostStrategy, IconImageFuture, IconImagePicker, LoginRequest, MemoryDesktopItemsService,
    MemoryExternalUrlService, MemorySessionService, NoopIconImagePicker, PickedIconImage,
    RegisterRequest, SessionFuture, SessionInfo, SessionService, UpdateDesktopItemResponse,
};

use crate::{WebDesktopItemsService, WebExternalUrlService, WebIconImagePicker, WebSessionService};

/// Username the stub host signs in as.
pub const STUB_USERNAME: &str = "guest";

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "desktop-host-stub")]
    {
        HostStrategy::DesktopStub
    }

    #[cfg(not(feature = "desktop-host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

thread_local! {
    static STUB_DESKTOP_ITEMS: MemoryDesktopItemsService =
        MemoryDesktopItemsService::with_items(stub_items());
    static STUB_SESSION: MemorySessionService = {
        let session = MemorySessionService::with_account(STUB_USERNAME, STUB_USERNAME);
        session.sign_in_as(STUB_USERNAME);
        session
    };
}

fn stub_items() -> Vec<DesktopItemRecord> {
    [("1", "Rust", "https://www.rust-lang.org"), ("2", "Docs.rs", "https://docs.rs")]
        .into_iter()
        .map(|(id, name, url)| DesktopItemRecord {
            id: id.to_string(),
            user_id: None,
            name: name.to_string(),
            url: url.to_string(),
            icon: None,
            width: Some(72),
            height: Some(92),
            pos_x: None,
            pos_y: None,
            created_at: None,
        })
        .collect()
}

/// Adapter enum that erases the concrete shortcut backend behind [`DesktopItemsService`].
#[derive(Debug, Clone)]
pub enum DesktopItemsServiceAdapter {
    /// REST backend.
    Browser(WebDesktopItemsService),
    /// Process-local in-memory backend.
    DesktopStub(MemoryDesktopItemsService),
}

impl DesktopItemsService for DesktopItemsServiceAdapter {
    fn list_items<'a>(&'a self) -> DesktopItemsFuture<'a, Result<DesktopItemsList, ApiError>> {
        match self {
            Self::Browser(service) => service.list_items(),
            Self::DesktopStub(service) => service.list_items(),
        }
    }

    fn create_item<'a>(
        &'a self,
        request: &'a CreateDesktopItemRequest,
    ) -> DesktopItemsFuture<'a, Result<CreateDesktopItemResponse, ApiError>> {
        match self {
            Self::Browser(service) => service.create_item(request),
            Self::DesktopStub(service) => service.create_item(request),
        }
    }

    fn update_item<'a>(
        &'a self,
        id: &'a str,
        patch: &'a DesktopItemPatch,
    ) -> DesktopItemsFuture<'a, Result<UpdateDesktopItemResponse, ApiError>> {
        match self {
            Self::Browser(service) => service.update_item(id, patch),
            Self::DesktopStub(service) => service.update_item(id, patch),
        }
    }

    fn delete_item<'a>(
        &'a self,
        id: &'a str,
    ) -> DesktopItemsFuture<'a, Result<DeleteDesktopItemResponse, ApiError>> {
        match self {
            Self::Browser(service) => service.delete_item(id),
            Self::DesktopStub(service) => service.delete_item(id),
        }
    }
}

/// Adapter enum that erases the concrete session backend behind [`SessionService`].
#[derive(Debug, Clone)]
pub enum SessionServiceAdapter {
    /// Cookie session against the REST backend.
    Browser(WebSessionService),
    /// Always-signed-in stub session.
    DesktopStub(MemorySessionService),
}

impl SessionService for SessionServiceAdapter {
    fn current_session<'a>(&'a self) -> SessionFuture<'a, Result<SessionInfo, ApiError>> {
        match self {
            Self::Browser(service) => service.current_session(),
            Self::DesktopStub(service) => service.current_session(),
        }
    }

    fn login<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        match self {
            Self::Browser(service) => service.login(request),
            Self::DesktopStub(service) => service.login(request),
        }
    }

    fn register<'a>(
        &'a self,
        request: &'a RegisterRequest,
    ) -> SessionFuture<'a, Result<(), ApiError>> {
        match self {
            Self::Browser(service) => service.register(request),
            Self::DesktopStub(service) => service.register(request),
        }
    }

    fn logout<'a>(&'a self) -> SessionFuture<'a, Result<(), ApiError>> {
        match self {
            Self::Browser(service) => service.logout(),
            Self::DesktopStub(service) => service.logout(),
        }
    }

    fn load_background<'a>(
        &'a self,
    ) -> SessionFuture<'a, Result<BackgroundPreference, ApiError>> {
        match self {
            Self::Browser(service) => service.load_background(),
            Self::DesktopStub(service) => service.load_background(),
        }
    }
}

/// Adapter enum that erases the concrete external URL backend behind [`ExternalUrlService`].
#[derive(Debug, Clone)]
pub enum ExternalUrlServiceAdapter {
    /// `window.open`.
    Browser(WebExternalUrlService),
    /// Records URLs instead of navigating.
    DesktopStub(MemoryExternalUrlService),
}

impl ExternalUrlService for ExternalUrlServiceAdapter {
    fn open_url<'a>(&'a self, url: &'a str) -> ExternalUrlFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(service) => service.open_url(url),
            Self::DesktopStub(service) => service.open_url(url),
        }
    }
}

/// Adapter enum that erases the concrete image picker behind [`IconImagePicker`].
#[derive(Debug, Clone, Copy)]
pub enum IconImagePickerAdapter {
    /// Browser file input.
    Browser(WebIconImagePicker),
    /// Picker that never returns a file.
    DesktopStub(NoopIconImagePicker),
}

impl IconImagePicker for IconImagePickerAdapter {
    fn pick_icon_image<'a>(
        &'a self,
        max_bytes: u64,
    ) -> IconImageFuture<'a, Result<Option<PickedIconImage>, String>> {
        match self {
            Self::Browser(picker) => picker.pick_icon_image(max_bytes),
            Self::DesktopStub(picker) => picker.pick_icon_image(max_bytes),
        }
    }
}

/// Builds the shortcut persistence adapter for the compile-time selected host strategy.
pub fn desktop_items_service() -> DesktopItemsServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => {
            DesktopItemsServiceAdapter::Browser(WebDesktopItemsService::default())
        }
        HostStrategy::DesktopStub => DesktopItemsServiceAdapter::DesktopStub(
            STUB_DESKTOP_ITEMS.with(|service| service.clone()),
        ),
    }
}

/// Builds the session adapter for the compile-time selected host strategy.
pub fn session_service() -> SessionServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => SessionServiceAdapter::Browser(WebSessionService::default()),
        HostStrategy::DesktopStub => {
            SessionServiceAdapter::DesktopStub(STUB_SESSION.with(|service| service.clone()))
        }
    }
}

/// Builds the external URL adapter for the compile-time selected host strategy.
pub fn external_url_service() -> ExternalUrlServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => ExternalUrlServiceAdapter::Browser(WebExternalUrlService),
        HostStrategy::DesktopStub => {
            ExternalUrlServiceAdapter::DesktopStub(MemoryExternalUrlService::default())
        }
    }
}

/// Builds the icon image picker for the compile-time selected host strategy.
pub fn icon_image_picker() -> IconImagePickerAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => IconImagePickerAdapter::Browser(WebIconImagePicker),
        HostStrategy::DesktopStub => IconImagePickerAdapter::DesktopStub(NoopIconImagePicker),
    }
}

/// Assembles the injectable service bundle for the compile-time selected host strategy.
pub fn build_host_services() -> HostServices {
    HostServices {
        desktop_items: Rc::new(desktop_items_service()),
        session: Rc::new(session_service()),
        external_urls: Rc::new(external_url_service()),
        icon_images: Rc::new(icon_image_picker()),
        host_strategy: selected_host_strategy(),
    }
}
