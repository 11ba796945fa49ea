//! Host-side runtime helpers for executing reducer effects and querying browser environment state.
//!
//! Effect execution is plain async code over the injected [`HostServices`]; results are reported
//! back through a dispatch callback so the same path runs under the Leptos executor and in the
//! headless tests below.

mod host_ui;
mod icon_effects;
mod session_effects;

use std::rc::Rc;

use platform_host::{
    DesktopItemsService, ExternalUrlService, HostServices, IconImagePicker, SessionService,
};

use crate::{
    layout::SurfaceSize,
    reducer::{DesktopAction, RuntimeEffect},
};

/// Callback receiving actions produced while an effect runs.
pub type EffectDispatch<'a> = &'a dyn Fn(DesktopAction);

#[derive(Clone)]
/// Host service bundle for desktop runtime side effects.
pub struct DesktopHostContext {
    services: HostServices,
}

impl DesktopHostContext {
    /// Creates a runtime host context from an injected service bundle.
    pub fn new(services: HostServices) -> Self {
        Self { services }
    }

    pub fn desktop_items_service(&self) -> Rc<dyn DesktopItemsService> {
        self.services.desktop_items.clone()
    }

    pub fn session_service(&self) -> Rc<dyn SessionService> {
        self.services.session.clone()
    }

    pub fn external_url_service(&self) -> Rc<dyn ExternalUrlService> {
        self.services.external_urls.clone()
    }

    pub fn icon_image_picker(&self) -> Rc<dyn IconImagePicker> {
        self.services.icon_images.clone()
    }

    /// Returns the stable name of the selected host strategy.
    pub fn host_strategy_name(&self) -> &'static str {
        self.services.host_strategy.as_str()
    }

    /// Current size of the desktop surface.
    pub fn desktop_surface_size(&self) -> SurfaceSize {
        host_ui::desktop_surface_size()
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    ///
    /// Failures are logged here; anything the reducer must react to is dispatched as an action.
    pub async fn run_runtime_effect(&self, effect: RuntimeEffect, dispatch: EffectDispatch<'_>) {
        match effect {
            RuntimeEffect::CheckSession => session_effects::check_session(self, dispatch).await,
            RuntimeEffect::Login(request) => {
                session_effects::login(self, request, dispatch).await;
            }
            RuntimeEffect::Register(request) => {
                session_effects::register(self, request, dispatch).await;
            }
            RuntimeEffect::Logout => session_effects::logout(self).await,
            RuntimeEffect::LoadBackground => {
                session_effects::load_background(self, dispatch).await;
            }
            RuntimeEffect::LoadIcons { ticket } => {
                icon_effects::load_icons(self, ticket, dispatch).await;
            }
            RuntimeEffect::CreateIcon { ticket, request } => {
                icon_effects::create_icon(self, ticket, request, dispatch).await;
            }
            RuntimeEffect::PersistPosition {
                ticket,
                icon_id,
                position,
            } => icon_effects::persist_position(self, ticket, icon_id, position, dispatch).await,
            RuntimeEffect::PersistGeometry {
                ticket,
                icon_id,
                position,
                size,
            } => {
                icon_effects::persist_geometry(self, ticket, icon_id, position, size, dispatch)
                    .await;
            }
            RuntimeEffect::PersistIconImage {
                ticket,
                icon_id,
                image,
            } => icon_effects::persist_image(self, ticket, icon_id, image, dispatch).await,
            RuntimeEffect::DeleteIcon { ticket, icon_id } => {
                icon_effects::delete_icon(self, ticket, icon_id, dispatch).await;
            }
            RuntimeEffect::PersistArrangement { ticket, placements } => {
                icon_effects::persist_arrangement(self, ticket, placements, dispatch).await;
            }
            RuntimeEffect::PickIconImage { icon_id } => {
                host_ui::pick_icon_image(self, icon_id, dispatch).await;
            }
            RuntimeEffect::OpenExternalUrl(url) => host_ui::open_external_url(self, &url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use futures::executor::block_on;
    use platform_host::{
        ApiError, DesktopItemPatch, DesktopItemRecord, DesktopItemsCall, DesktopItemsOperation,
        MemoryDesktopItemsService, MemoryHost, MemorySessionService, PickedIconImage,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        drag::{PointerDevice, PointerDown, PointerPosition, PRIMARY_BUTTON},
        layout::ResizePreset,
        model::{
            DesktopIcon, DesktopState, IconId, IconPosition, InteractionState, SessionState,
            ShortcutDialogState,
        },
        reducer::{reduce_desktop, IconCommand},
    };

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn record(id: &str, x: i32, y: i32) -> DesktopItemRecord {
        DesktopItemRecord {
            id: id.to_string(),
            user_id: None,
            name: format!("icon {id}"),
            url: format!("https://{id}.example"),
            icon: Some("/icons/website.png".to_string()),
            width: Some(72),
            height: Some(92),
            pos_x: Some(x),
            pos_y: Some(y),
            created_at: Some(format!("2024-01-0{id} 00:00:00")),
        }
    }

    /// Drives the reducer and the host effects to quiescence against in-memory services.
    struct Harness {
        backend: MemoryHost,
        host: DesktopHostContext,
        state: DesktopState,
        interaction: InteractionState,
    }

    impl Harness {
        fn signed_in(records: Vec<DesktopItemRecord>) -> Self {
            let backend = MemoryHost {
                desktop_items: MemoryDesktopItemsService::with_items(records),
                session: MemorySessionService::with_account("ada", "lovelace"),
                ..MemoryHost::default()
            };
            backend.session.sign_in_as("ada");
            let mut harness = Self {
                host: DesktopHostContext::new(backend.services()),
                backend,
                state: DesktopState::default(),
                interaction: InteractionState::default(),
            };
            harness.dispatch(DesktopAction::Boot);
            harness.backend.desktop_items.clear_calls();
            harness
        }

        fn dispatch(&mut self, action: DesktopAction) {
            let mut pending = VecDeque::from([action]);
            while let Some(action) = pending.pop_front() {
                let effects = reduce_desktop(&mut self.state, &mut self.interaction, action)
                    .expect("reduce");
                for effect in effects {
                    let emitted = RefCell::new(Vec::new());
                    block_on(
                        self.host
                            .run_runtime_effect(effect, &|action: DesktopAction| {
                                emitted.borrow_mut().push(action)
                            }),
                    );
                    pending.extend(emitted.into_inner());
                }
            }
        }

        fn drag(&mut self, id: &str, from: PointerPosition, to: PointerPosition) {
            self.dispatch(DesktopAction::IconPointerDown {
                icon_id: IconId::from(id),
                input: PointerDown::mouse(PRIMARY_BUTTON, from),
            });
            self.dispatch(DesktopAction::PointerMoved {
                device: PointerDevice::Mouse,
                pointer: to,
            });
            self.dispatch(DesktopAction::PointerReleased {
                device: PointerDevice::Mouse,
            });
        }

        fn icon(&self, id: &str) -> Option<&DesktopIcon> {
            self.state.icons.get(&IconId::from(id))
        }

        fn stored(&self, id: &str) -> Option<DesktopItemRecord> {
            self.backend.desktop_items.item(id)
        }

        fn update_calls(&self) -> Vec<DesktopItemsCall> {
            self.backend
                .desktop_items
                .calls()
                .into_iter()
                .filter(|call| matches!(call, DesktopItemsCall::Update { .. }))
                .collect()
        }
    }

    #[test]
    fn boot_with_session_loads_icons_and_background() {
        let backend_records = vec![record("1", 12, 12), record("2", 132, 12)];
        let harness = Harness::signed_in(backend_records);

        assert_eq!(harness.state.session.username(), Some("ada"));
        assert_eq!(harness.state.icons.len(), 2);
        assert_eq!(harness.state.background_url, None);
    }

    #[test]
    fn boot_without_session_shows_sign_in_and_login_loads_icons() {
        let backend = MemoryHost {
            desktop_items: MemoryDesktopItemsService::with_items(vec![record("1", 12, 12)]),
            session: MemorySessionService::with_account("ada", "lovelace"),
            ..MemoryHost::default()
        };
        backend
            .session
            .set_background_url(Some("/wallpapers/dunes.jpg".to_string()));
        let mut harness = Harness {
            host: DesktopHostContext::new(backend.services()),
            backend,
            state: DesktopState::default(),
            interaction: InteractionState::default(),
        };

        harness.dispatch(DesktopAction::Boot);
        assert_eq!(harness.state.session, SessionState::SignedOut { error: None });
        assert!(harness.state.icons.is_empty());

        harness.dispatch(DesktopAction::SubmitLogin {
            username: "ada".to_string(),
            password: "wrong".to_string(),
        });
        assert_eq!(
            harness.state.session,
            SessionState::SignedOut {
                error: Some("Invalid username or password".to_string()),
            }
        );

        harness.dispatch(DesktopAction::SubmitLogin {
            username: "ada".to_string(),
            password: "lovelace".to_string(),
        });
        assert_eq!(harness.state.session.username(), Some("ada"));
        assert_eq!(harness.state.icons.len(), 1);
        assert_eq!(
            harness.state.background_url.as_deref(),
            Some("/wallpapers/dunes.jpg")
        );
    }

    #[test]
    fn new_account_registers_then_signs_in() {
        let backend = MemoryHost::default();
        let mut harness = Harness {
            host: DesktopHostContext::new(backend.services()),
            backend,
            state: DesktopState::default(),
            interaction: InteractionState::default(),
        };
        harness.dispatch(DesktopAction::Boot);

        harness.dispatch(DesktopAction::ShowRegistration);
        harness.dispatch(DesktopAction::SubmitRegistration {
            username: "grace".to_string(),
            password: "cobol".to_string(),
            email: "grace@example.com".to_string(),
        });
        assert_eq!(harness.state.session, SessionState::SignedOut { error: None });
        assert_eq!(harness.backend.session.signed_in_user(), None);

        harness.dispatch(DesktopAction::SubmitLogin {
            username: "grace".to_string(),
            password: "cobol".to_string(),
        });
        assert_eq!(harness.state.session.username(), Some("grace"));
    }

    #[test]
    fn resync_is_idempotent() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12), record("2", 40, 300)]);
        let first = harness.state.icons.clone();

        harness.dispatch(DesktopAction::Refresh);
        let second = harness.state.icons.clone();
        harness.dispatch(DesktopAction::Refresh);

        assert_eq!(first, second);
        assert_eq!(second, harness.state.icons);
        assert_eq!(harness.update_calls(), Vec::new());
    }

    #[test]
    fn small_press_never_persists_and_real_drag_persists_clamped_position() {
        let mut harness = Harness::signed_in(vec![record("1", 50, 60)]);

        harness.drag(
            "1",
            PointerPosition::new(100, 100),
            PointerPosition::new(104, 100),
        );
        assert_eq!(harness.update_calls(), Vec::new());
        assert_eq!(
            harness.icon("1").map(|icon| icon.position),
            Some(IconPosition::new(50, 60))
        );

        harness.drag(
            "1",
            PointerPosition::new(100, 100),
            PointerPosition::new(-300, 105),
        );
        assert_eq!(
            harness.update_calls(),
            vec![DesktopItemsCall::Update {
                id: "1".to_string(),
                patch: DesktopItemPatch::position(0, 65),
            }]
        );
        let stored = harness.stored("1").expect("stored");
        assert_eq!((stored.pos_x, stored.pos_y), (Some(0), Some(65)));
        assert!(harness.state.is_idle());
    }

    #[test]
    fn drag_far_up_left_never_goes_negative() {
        let mut harness = Harness::signed_in(vec![record("1", 5, 5)]);

        harness.drag(
            "1",
            PointerPosition::new(10, 10),
            PointerPosition::new(-900, -900),
        );

        let stored = harness.stored("1").expect("stored");
        assert_eq!((stored.pos_x, stored.pos_y), (Some(0), Some(0)));
    }

    #[test]
    fn partial_updates_preserve_other_fields() {
        let mut harness = Harness::signed_in(vec![record("1", 30, 40)]);
        harness.backend.icon_images.queue(PickedIconImage {
            file_name: "logo.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 1024,
            data_url: Some(PNG.to_string()),
        });

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::ChangeImage,
        });
        let stored = harness.stored("1").expect("stored");
        assert_eq!(stored.icon.as_deref(), Some(PNG));
        assert_eq!((stored.pos_x, stored.pos_y), (Some(30), Some(40)));
        assert_eq!((stored.width, stored.height), (Some(72), Some(92)));

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::Resize(ResizePreset::Small),
        });
        let stored = harness.stored("1").expect("stored");
        assert_eq!(stored.icon.as_deref(), Some(PNG));
        assert_eq!((stored.width, stored.height), (Some(48), Some(48)));
        assert_eq!((stored.pos_x, stored.pos_y), (Some(30), Some(40)));
        assert_eq!(stored.name, "icon 1");
    }

    #[test]
    fn auto_arrange_is_deterministic_and_sequential() {
        let mut harness = Harness::signed_in(vec![
            record("1", 400, 400),
            record("2", 12, 12),
            record("3", 77, 500),
        ]);

        harness.dispatch(DesktopAction::AutoArrange { surface_width: 300 });
        let first = harness.state.icons.clone();
        harness.dispatch(DesktopAction::AutoArrange { surface_width: 300 });

        assert_eq!(first, harness.state.icons);
        let stored: Vec<_> = harness
            .backend
            .desktop_items
            .items()
            .into_iter()
            .map(|item| (item.id, item.pos_x, item.pos_y))
            .collect();
        assert_eq!(
            stored,
            vec![
                ("1".to_string(), Some(12), Some(12)),
                ("2".to_string(), Some(132), Some(12)),
                ("3".to_string(), Some(12), Some(144)),
            ]
        );
        let ids: Vec<_> = harness
            .update_calls()
            .into_iter()
            .filter_map(|call| match call {
                DesktopItemsCall::Update { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "1", "2", "3"]);
    }

    #[test]
    fn failed_create_never_appears() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);
        harness.backend.desktop_items.fail_next(
            DesktopItemsOperation::Create,
            ApiError::Rejected {
                status: 400,
                message: "url is invalid".to_string(),
            },
        );
        let before = harness.state.icons.clone();

        harness.dispatch(DesktopAction::OpenShortcutDialog);
        harness.dispatch(DesktopAction::SubmitShortcut {
            name: "Docs".to_string(),
            url: "docs.rs".to_string(),
            surface_width: 1024,
        });

        assert_eq!(harness.state.icons, before);
        assert_eq!(harness.backend.desktop_items.items().len(), 1);
        assert_eq!(
            harness.state.shortcut_dialog,
            ShortcutDialogState::Editing {
                error: Some("url is invalid".to_string()),
            }
        );
    }

    #[test]
    fn successful_create_appears_after_resync() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);

        harness.dispatch(DesktopAction::OpenShortcutDialog);
        harness.dispatch(DesktopAction::SubmitShortcut {
            name: "Docs".to_string(),
            url: "docs.rs".to_string(),
            surface_width: 1024,
        });

        assert_eq!(harness.state.shortcut_dialog, ShortcutDialogState::Hidden);
        let created = harness.icon("2").expect("created icon");
        assert_eq!(created.url, "https://docs.rs");
        assert_eq!(created.position, IconPosition::new(132, 12));
        assert_eq!((created.width, created.height), (Some(72), Some(92)));
    }

    #[test]
    fn failed_delete_restores_the_icon() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12), record("2", 132, 12)]);
        harness
            .backend
            .desktop_items
            .fail_next(DesktopItemsOperation::Delete, ApiError::Network("offline".to_string()));

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::Delete,
        });

        assert!(harness.icon("1").is_some());
        assert_eq!(harness.state.icons.len(), 2);
        assert!(harness.state.is_idle());
    }

    #[test]
    fn failed_move_restores_canonical_position() {
        let mut harness = Harness::signed_in(vec![record("1", 50, 60)]);
        harness
            .backend
            .desktop_items
            .fail_next(DesktopItemsOperation::Update, ApiError::Network("offline".to_string()));

        harness.drag(
            "1",
            PointerPosition::new(100, 100),
            PointerPosition::new(200, 200),
        );

        assert_eq!(
            harness.icon("1").map(|icon| icon.position),
            Some(IconPosition::new(50, 60))
        );
    }

    #[test]
    fn oversized_image_is_rejected_without_patch() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);
        harness.backend.icon_images.queue(PickedIconImage {
            file_name: "poster.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 300 * 1024,
            data_url: Some(PNG.to_string()),
        });

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::ChangeImage,
        });

        assert_eq!(harness.update_calls(), Vec::new());
        assert_eq!(
            harness.icon("1").and_then(|icon| icon.image.clone()).as_deref(),
            Some("/icons/website.png")
        );
        assert_eq!(
            harness.state.notice.as_deref(),
            Some("Image too large. Please choose a file under 100 KB.")
        );
    }

    #[test]
    fn failed_image_update_keeps_local_image_without_resync() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);
        harness
            .backend
            .desktop_items
            .fail_next(DesktopItemsOperation::Update, ApiError::Network("offline".to_string()));
        harness.backend.icon_images.queue(PickedIconImage {
            file_name: "logo.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 1024,
            data_url: Some(PNG.to_string()),
        });

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::ChangeImage,
        });

        assert_eq!(
            harness.icon("1").and_then(|icon| icon.image.clone()).as_deref(),
            Some(PNG)
        );
        assert!(!harness
            .backend
            .desktop_items
            .calls()
            .contains(&DesktopItemsCall::List));
    }

    #[test]
    fn expired_session_signs_out_without_retry() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);
        harness.backend.desktop_items.expire_session();

        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::Resize(ResizePreset::Medium),
        });

        assert!(!harness.state.session.is_signed_in());
        assert!(harness.state.icons.is_empty());
        assert_eq!(harness.backend.desktop_items.calls().len(), 1);
    }

    #[test]
    fn open_command_and_click_open_the_target() {
        let mut harness = Harness::signed_in(vec![record("1", 12, 12)]);

        harness.dispatch(DesktopAction::IconClicked {
            icon_id: IconId::from("1"),
        });
        harness.dispatch(DesktopAction::IconCommand {
            icon_id: IconId::from("1"),
            command: IconCommand::Open,
        });

        assert_eq!(
            harness.backend.external_urls.opened(),
            vec!["https://1.example", "https://1.example"]
        );
    }
}
