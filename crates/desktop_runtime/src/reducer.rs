//! Reducer actions, side-effect intents, and transition logic for the desktop icon runtime.

use platform_host::{
    ApiError, CreateDesktopItemRequest, LoginRequest, PickedIconImage, RegisterRequest,
};
use thiserror::Error;

use crate::{
    account,
    config::icon_config,
    drag::{DragController, DragRelease, PointerDevice, PointerDown, PointerPosition},
    layout::{self, ResizePreset, SurfaceSize},
    model::{
        CommandKind, CommandPhase, CommandTicket, ContextMenuState, DesktopIcon, DesktopState,
        IconId, IconLayerVisibility, IconPatch, IconPosition, InteractionState, SessionState,
        ShortcutDialogState,
    },
    shortcut,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Commands offered by the icon context menu.
pub enum IconCommand {
    /// Open the shortcut target in a new browsing context.
    Open,
    /// Replace the icon artwork with a local image.
    ChangeImage,
    /// Apply a size preset.
    Resize(ResizePreset),
    /// Delete the shortcut.
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Start the shell by checking the cookie session.
    Boot,
    /// A session is established (boot check or login).
    SessionStarted {
        /// Signed-in user.
        username: String,
    },
    /// No session; show the sign-in overlay.
    SessionEnded {
        /// Message shown on the sign-in overlay.
        error: Option<String>,
    },
    /// Submit the sign-in form.
    SubmitLogin {
        /// Login name.
        username: String,
        /// Password.
        password: String,
    },
    /// The backend rejected the sign-in attempt.
    LoginFailed {
        /// Message shown on the sign-in overlay.
        message: String,
    },
    /// Switch the sign-in overlay to the account-creation form.
    ShowRegistration,
    /// Switch the sign-in overlay back to the sign-in form.
    ShowLogin,
    /// Submit the account-creation form.
    SubmitRegistration {
        /// Requested login name.
        username: String,
        /// Password.
        password: String,
        /// Contact address.
        email: String,
    },
    /// The account was created; the user signs in next.
    Registered,
    /// The backend rejected the registration.
    RegistrationFailed {
        /// Message shown on the account-creation form.
        message: String,
    },
    /// Sign out and clear the desktop.
    Logout,
    /// Saved wallpaper preference arrived.
    BackgroundLoaded {
        /// Wallpaper URL, if one is saved.
        url: Option<String>,
    },
    /// A full icon list fetch finished.
    IconsLoaded {
        /// Command whose failure triggered this resync, if any.
        ticket: Option<CommandTicket>,
        /// Fetched icons in server order, or the fetch failure.
        result: Result<Vec<DesktopIcon>, ApiError>,
    },
    /// Mouse-down or touch-start on an icon.
    IconPointerDown {
        /// Pressed icon.
        icon_id: IconId,
        /// Press details.
        input: PointerDown,
    },
    /// Pointer moved anywhere in the window.
    PointerMoved {
        /// Moving device.
        device: PointerDevice,
        /// Viewport coordinates.
        pointer: PointerPosition,
    },
    /// Pointer released anywhere in the window.
    PointerReleased {
        /// Releasing device.
        device: PointerDevice,
    },
    /// Click on an icon.
    IconClicked {
        /// Clicked icon.
        icon_id: IconId,
    },
    /// Right-click on the empty desktop surface.
    OpenDesktopMenu {
        /// Pointer position relative to the surface.
        pointer: IconPosition,
        /// Current surface size.
        surface: SurfaceSize,
    },
    /// Right-click on an icon.
    OpenIconMenu {
        /// Target icon.
        icon_id: IconId,
        /// Pointer position relative to the surface.
        pointer: IconPosition,
        /// Current surface size.
        surface: SurfaceSize,
    },
    /// Close any open context menu.
    CloseMenus,
    /// Run an icon context-menu command.
    IconCommand {
        /// Target icon.
        icon_id: IconId,
        /// Command to run.
        command: IconCommand,
    },
    /// The image picker returned a file for `icon_id`.
    IconImagePicked {
        /// Target icon.
        icon_id: IconId,
        /// Picked file.
        image: PickedIconImage,
    },
    /// Open the new-shortcut dialog.
    OpenShortcutDialog,
    /// Close the new-shortcut dialog.
    CancelShortcutDialog,
    /// Submit the new-shortcut dialog.
    SubmitShortcut {
        /// Raw name input.
        name: String,
        /// Raw URL input.
        url: String,
        /// Surface width used for grid placement.
        surface_width: i32,
    },
    /// Snap every icon to the grid.
    AutoArrange {
        /// Surface width used for grid placement.
        surface_width: i32,
    },
    /// Show or hide the icon layer.
    SetIconLayer(IconLayerVisibility),
    /// Reload the icon list.
    Refresh,
    /// A command's request succeeded.
    CommandSucceeded {
        /// Finished command.
        ticket: CommandTicket,
    },
    /// A command's request failed.
    CommandFailed {
        /// Failed command.
        ticket: CommandTicket,
        /// Failure reported by the backend.
        error: ApiError,
    },
    /// Clear the notice line.
    DismissNotice,
    /// Escape pressed: close menus and the dialog.
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host to execute.
pub enum RuntimeEffect {
    /// Query the cookie session.
    CheckSession,
    /// Sign in.
    Login(LoginRequest),
    /// Create an account.
    Register(RegisterRequest),
    /// Sign out.
    Logout,
    /// Load the saved wallpaper.
    LoadBackground,
    /// Fetch the full icon list; `ticket` names the failed command being recovered.
    LoadIcons { ticket: Option<CommandTicket> },
    /// Create a shortcut.
    CreateIcon {
        ticket: CommandTicket,
        request: CreateDesktopItemRequest,
    },
    /// Persist a dragged position.
    PersistPosition {
        ticket: CommandTicket,
        icon_id: IconId,
        position: IconPosition,
    },
    /// Persist a size together with the current position.
    PersistGeometry {
        ticket: CommandTicket,
        icon_id: IconId,
        position: IconPosition,
        size: i32,
    },
    /// Persist new artwork.
    PersistIconImage {
        ticket: CommandTicket,
        icon_id: IconId,
        image: String,
    },
    /// Delete a shortcut.
    DeleteIcon {
        ticket: CommandTicket,
        icon_id: IconId,
    },
    /// Persist grid positions one icon at a time.
    PersistArrangement {
        ticket: CommandTicket,
        placements: Vec<(IconId, IconPosition)>,
    },
    /// Ask the user for an image file.
    PickIconImage { icon_id: IconId },
    /// Open a URL outside the shell.
    OpenExternalUrl(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for invalid actions.
pub enum ReducerError {
    /// The target icon id was not found in the current state.
    #[error("icon not found: {0}")]
    IconNotFound(IconId),
}

/// Applies a [`DesktopAction`] to the desktop state and collects resulting side effects.
///
/// Mutations are optimistic: the model changes first and the emitted effect persists the change.
/// Failed moves, resizes, and deletes are recovered by a full reload tagged with the command's
/// ticket.
///
/// # Errors
///
/// Returns [`ReducerError::IconNotFound`] when an action references an icon that is not present.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let config = icon_config();
    let mut effects = Vec::new();
    match action {
        DesktopAction::Boot => {
            state.session = SessionState::Checking;
            effects.push(RuntimeEffect::CheckSession);
        }
        DesktopAction::SessionStarted { username } => {
            state.session = SessionState::SignedIn { username };
            effects.push(RuntimeEffect::LoadIcons { ticket: None });
            effects.push(RuntimeEffect::LoadBackground);
        }
        DesktopAction::SessionEnded { error } => {
            sign_out(state, interaction, error);
        }
        DesktopAction::SubmitLogin { username, password } => {
            if matches!(state.session, SessionState::SignedOut { .. }) {
                match account::login_request(&username, &password) {
                    Ok(request) => {
                        state.session = SessionState::SigningIn;
                        effects.push(RuntimeEffect::Login(request));
                    }
                    Err(err) => {
                        state.session = SessionState::SignedOut {
                            error: Some(err.to_string()),
                        };
                    }
                }
            }
        }
        DesktopAction::ShowRegistration => {
            if matches!(state.session, SessionState::SignedOut { .. }) {
                state.session = SessionState::Registering { error: None };
            }
        }
        DesktopAction::ShowLogin => {
            if matches!(state.session, SessionState::Registering { .. }) {
                state.session = SessionState::SignedOut { error: None };
            }
        }
        DesktopAction::SubmitRegistration {
            username,
            password,
            email,
        } => {
            if matches!(state.session, SessionState::Registering { .. }) {
                match account::register_request(&username, &password, &email) {
                    Ok(request) => {
                        state.session = SessionState::SubmittingRegistration;
                        effects.push(RuntimeEffect::Register(request));
                    }
                    Err(err) => {
                        state.session = SessionState::Registering {
                            error: Some(err.to_string()),
                        };
                    }
                }
            }
        }
        DesktopAction::Registered => {
            if state.session == SessionState::SubmittingRegistration {
                state.session = SessionState::SignedOut { error: None };
            }
        }
        DesktopAction::RegistrationFailed { message } => {
            if state.session == SessionState::SubmittingRegistration {
                state.session = SessionState::Registering {
                    error: Some(message),
                };
            }
        }
        DesktopAction::LoginFailed { message } => {
            state.session = SessionState::SignedOut {
                error: Some(message),
            };
        }
        DesktopAction::Logout => {
            if state.session.is_signed_in() {
                sign_out(state, interaction, None);
                effects.push(RuntimeEffect::Logout);
            }
        }
        DesktopAction::BackgroundLoaded { url } => {
            if state.session.is_signed_in() {
                state.background_url = url.filter(|url| !url.trim().is_empty());
            }
        }
        DesktopAction::IconsLoaded { ticket, result } => {
            if let Some(ticket) = ticket {
                state.finish_command(ticket);
            }
            match result {
                Ok(icons) if state.session.is_signed_in() => {
                    state.icons.replace_all(icons);
                    forget_missing_icons(state, &mut interaction.drag);
                }
                Ok(_) => {}
                Err(ApiError::Unauthorized) => expire_session(state, interaction),
                Err(_) => {}
            }
        }
        DesktopAction::IconPointerDown { icon_id, input } => {
            if !state.session.is_signed_in() {
                return Ok(effects);
            }
            let origin = icon(state, &icon_id)?.position;
            interaction.drag.pointer_down(icon_id, origin, input);
        }
        DesktopAction::PointerMoved { device, pointer } => {
            if let Some((icon_id, position)) =
                interaction
                    .drag
                    .pointer_move(device, pointer, config.drag.threshold_px)
            {
                if !state
                    .icons
                    .apply_local(&icon_id, IconPatch::position(position))
                {
                    forget_missing_icons(state, &mut interaction.drag);
                }
            }
        }
        DesktopAction::PointerReleased { device } => {
            if let DragRelease::Dropped { icon_id, position } = interaction.drag.pointer_up(device)
            {
                if state.icons.contains(&icon_id) {
                    let ticket = state.begin_command(CommandKind::Move, Some(icon_id.clone()));
                    effects.push(RuntimeEffect::PersistPosition {
                        ticket,
                        icon_id,
                        position,
                    });
                }
            }
        }
        DesktopAction::IconClicked { icon_id } => {
            if interaction.drag.consume_click(&icon_id) {
                return Ok(effects);
            }
            let url = icon(state, &icon_id)?.url.clone();
            if !url.is_empty() {
                effects.push(RuntimeEffect::OpenExternalUrl(url));
            }
        }
        DesktopAction::OpenDesktopMenu { pointer, surface } => {
            if state.session.is_signed_in() {
                state.context_menu = ContextMenuState::Desktop {
                    at: layout::place_context_menu(pointer, surface, &config.context_menu),
                };
            }
        }
        DesktopAction::OpenIconMenu {
            icon_id,
            pointer,
            surface,
        } => {
            if !state.session.is_signed_in() {
                return Ok(effects);
            }
            icon(state, &icon_id)?;
            state.context_menu = ContextMenuState::Icon {
                icon_id,
                at: layout::place_context_menu(pointer, surface, &config.context_menu),
            };
        }
        DesktopAction::CloseMenus => {
            state.context_menu = ContextMenuState::Hidden;
        }
        DesktopAction::IconCommand { icon_id, command } => {
            state.context_menu = ContextMenuState::Hidden;
            let current = icon(state, &icon_id)?;
            match command {
                IconCommand::Open => {
                    let url = current.url.clone();
                    if !url.is_empty() {
                        effects.push(RuntimeEffect::OpenExternalUrl(url));
                    }
                }
                IconCommand::ChangeImage => {
                    effects.push(RuntimeEffect::PickIconImage { icon_id });
                }
                IconCommand::Resize(preset) => {
                    let position = current.position;
                    let size = preset.image_size(&config.resize);
                    state.icons.apply_local(&icon_id, IconPatch::size(size));
                    let ticket = state.begin_command(CommandKind::Resize, Some(icon_id.clone()));
                    effects.push(RuntimeEffect::PersistGeometry {
                        ticket,
                        icon_id,
                        position,
                        size,
                    });
                }
                IconCommand::Delete => {
                    state.icons.remove(&icon_id);
                    forget_missing_icons(state, &mut interaction.drag);
                    let ticket = state.begin_command(CommandKind::Delete, Some(icon_id.clone()));
                    effects.push(RuntimeEffect::DeleteIcon { ticket, icon_id });
                }
            }
        }
        DesktopAction::IconImagePicked { icon_id, image } => {
            icon(state, &icon_id)?;
            match image.validate(config.upload.max_image_bytes) {
                Ok(data_url) => {
                    let data_url = data_url.to_string();
                    state
                        .icons
                        .apply_local(&icon_id, IconPatch::image(data_url.clone()));
                    let ticket =
                        state.begin_command(CommandKind::ChangeImage, Some(icon_id.clone()));
                    effects.push(RuntimeEffect::PersistIconImage {
                        ticket,
                        icon_id,
                        image: data_url,
                    });
                }
                Err(err) => state.notice = Some(err.to_string()),
            }
        }
        DesktopAction::OpenShortcutDialog => {
            state.context_menu = ContextMenuState::Hidden;
            if state.session.is_signed_in() && !state.shortcut_dialog.is_open() {
                state.shortcut_dialog = ShortcutDialogState::Editing { error: None };
            }
        }
        DesktopAction::CancelShortcutDialog => {
            state.shortcut_dialog = ShortcutDialogState::Hidden;
        }
        DesktopAction::SubmitShortcut {
            name,
            url,
            surface_width,
        } => {
            if !matches!(state.shortcut_dialog, ShortcutDialogState::Editing { .. }) {
                return Ok(effects);
            }
            match shortcut::validate_shortcut(&name, &url) {
                Ok(valid) => {
                    let request =
                        shortcut::create_request(valid, state.icons.len(), surface_width, config);
                    let ticket = state.begin_command(CommandKind::Create, None);
                    state.shortcut_dialog = ShortcutDialogState::Submitting;
                    effects.push(RuntimeEffect::CreateIcon { ticket, request });
                }
                Err(err) => {
                    state.shortcut_dialog = ShortcutDialogState::Editing {
                        error: Some(err.to_string()),
                    };
                }
            }
        }
        DesktopAction::AutoArrange { surface_width } => {
            state.context_menu = ContextMenuState::Hidden;
            let placements =
                layout::auto_arrange_positions(state.icons.iter(), surface_width, &config.grid);
            if placements.is_empty() {
                return Ok(effects);
            }
            for (icon_id, position) in &placements {
                state
                    .icons
                    .apply_local(icon_id, IconPatch::position(*position));
            }
            let ticket = state.begin_command(CommandKind::Arrange, None);
            effects.push(RuntimeEffect::PersistArrangement { ticket, placements });
        }
        DesktopAction::SetIconLayer(visibility) => {
            state.context_menu = ContextMenuState::Hidden;
            state.icon_layer = visibility;
        }
        DesktopAction::Refresh => {
            state.context_menu = ContextMenuState::Hidden;
            if state.session.is_signed_in() {
                effects.push(RuntimeEffect::LoadIcons { ticket: None });
            }
        }
        DesktopAction::CommandSucceeded { ticket } => {
            if let Some(record) = state.finish_command(ticket) {
                if record.kind == CommandKind::Create {
                    if state.shortcut_dialog == ShortcutDialogState::Submitting {
                        state.shortcut_dialog = ShortcutDialogState::Hidden;
                    }
                    effects.push(RuntimeEffect::LoadIcons { ticket: None });
                }
            }
        }
        DesktopAction::CommandFailed { ticket, error } => {
            let Some(record) = state.command(ticket).cloned() else {
                return Ok(effects);
            };
            if error.is_unauthorized() {
                expire_session(state, interaction);
                return Ok(effects);
            }
            match record.kind {
                kind if kind.resyncs_on_failure() => {
                    if let Some(command) = state.command_mut(ticket) {
                        command.phase = CommandPhase::Resyncing;
                    }
                    effects.push(RuntimeEffect::LoadIcons {
                        ticket: Some(ticket),
                    });
                }
                CommandKind::Create => {
                    state.finish_command(ticket);
                    let message = error.user_message();
                    if state.shortcut_dialog == ShortcutDialogState::Submitting {
                        state.shortcut_dialog = ShortcutDialogState::Editing {
                            error: Some(message),
                        };
                    } else {
                        state.notice = Some(message);
                    }
                }
                _ => {
                    state.finish_command(ticket);
                }
            }
        }
        DesktopAction::DismissNotice => {
            state.notice = None;
        }
        DesktopAction::Escape => {
            state.context_menu = ContextMenuState::Hidden;
            if matches!(state.shortcut_dialog, ShortcutDialogState::Editing { .. }) {
                state.shortcut_dialog = ShortcutDialogState::Hidden;
            }
        }
    }

    Ok(effects)
}

fn icon<'a>(state: &'a DesktopState, icon_id: &IconId) -> Result<&'a DesktopIcon, ReducerError> {
    state
        .icons
        .get(icon_id)
        .ok_or_else(|| ReducerError::IconNotFound(icon_id.clone()))
}

/// Drops drag contexts and menus that point at icons no longer in the model.
fn forget_missing_icons(state: &mut DesktopState, drag: &mut DragController) {
    drag.retain_icons(|icon_id| state.icons.contains(icon_id));
    if let ContextMenuState::Icon { icon_id, .. } = &state.context_menu {
        if !state.icons.contains(icon_id) {
            state.context_menu = ContextMenuState::Hidden;
        }
    }
}

fn expire_session(state: &mut DesktopState, interaction: &mut InteractionState) {
    sign_out(
        state,
        interaction,
        Some(ApiError::Unauthorized.user_message()),
    );
}

fn sign_out(state: &mut DesktopState, interaction: &mut InteractionState, error: Option<String>) {
    state.session = SessionState::SignedOut { error };
    state.icons.clear();
    state.commands.clear();
    state.context_menu = ContextMenuState::Hidden;
    state.shortcut_dialog = ShortcutDialogState::Hidden;
    state.background_url = None;
    state.notice = None;
    interaction.drag = DragController::default();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{drag::PRIMARY_BUTTON, layout::MenuPlacement};

    fn icon_at(id: &str, x: i32, y: i32) -> DesktopIcon {
        DesktopIcon {
            id: IconId::from(id),
            name: format!("icon {id}"),
            url: format!("https://{id}.example"),
            image: None,
            width: Some(72),
            height: Some(92),
            position: IconPosition::new(x, y),
            created_at: None,
        }
    }

    fn signed_in(icons: Vec<DesktopIcon>) -> (DesktopState, InteractionState) {
        let mut state = DesktopState {
            session: SessionState::SignedIn {
                username: "ada".to_string(),
            },
            ..DesktopState::default()
        };
        state.icons.replace_all(icons);
        (state, InteractionState::default())
    }

    fn reduce(
        state: &mut DesktopState,
        interaction: &mut InteractionState,
        action: DesktopAction,
    ) -> Vec<RuntimeEffect> {
        reduce_desktop(state, interaction, action).expect("reduce")
    }

    fn drag(
        state: &mut DesktopState,
        interaction: &mut InteractionState,
        id: &str,
        to: PointerPosition,
    ) -> Vec<RuntimeEffect> {
        reduce(
            state,
            interaction,
            DesktopAction::IconPointerDown {
                icon_id: IconId::from(id),
                input: PointerDown::mouse(PRIMARY_BUTTON, PointerPosition::new(100, 100)),
            },
        );
        reduce(
            state,
            interaction,
            DesktopAction::PointerMoved {
                device: PointerDevice::Mouse,
                pointer: to,
            },
        );
        reduce(
            state,
            interaction,
            DesktopAction::PointerReleased {
                device: PointerDevice::Mouse,
            },
        )
    }

    #[test]
    fn boot_checks_session_then_loads_icons_and_background() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        assert_eq!(
            reduce(&mut state, &mut interaction, DesktopAction::Boot),
            vec![RuntimeEffect::CheckSession]
        );
        assert_eq!(
            reduce(
                &mut state,
                &mut interaction,
                DesktopAction::SessionStarted {
                    username: "ada".to_string(),
                },
            ),
            vec![
                RuntimeEffect::LoadIcons { ticket: None },
                RuntimeEffect::LoadBackground,
            ]
        );
        assert_eq!(state.session.username(), Some("ada"));
    }

    #[test]
    fn drag_past_threshold_persists_clamped_position_and_swallows_click() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 20, 30)]);

        let effects = drag(
            &mut state,
            &mut interaction,
            "1",
            PointerPosition::new(40, 300),
        );

        let position = IconPosition::new(0, 230);
        assert_eq!(
            effects,
            vec![RuntimeEffect::PersistPosition {
                ticket: CommandTicket(1),
                icon_id: IconId::from("1"),
                position,
            }]
        );
        assert_eq!(
            state.icons.get(&IconId::from("1")).map(|icon| icon.position),
            Some(position)
        );
        assert_eq!(
            reduce(
                &mut state,
                &mut interaction,
                DesktopAction::IconClicked {
                    icon_id: IconId::from("1"),
                },
            ),
            Vec::new()
        );
        assert_eq!(
            reduce(
                &mut state,
                &mut interaction,
                DesktopAction::IconClicked {
                    icon_id: IconId::from("1"),
                },
            ),
            vec![RuntimeEffect::OpenExternalUrl("https://1.example".to_string())]
        );
    }

    #[test]
    fn press_without_drag_changes_nothing() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 20, 30)]);
        let before = state.clone();

        let effects = drag(
            &mut state,
            &mut interaction,
            "1",
            PointerPosition::new(102, 103),
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(state, before);
    }

    #[test]
    fn failed_move_resyncs_with_the_same_ticket() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 20, 30)]);
        drag(
            &mut state,
            &mut interaction,
            "1",
            PointerPosition::new(160, 160),
        );

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::CommandFailed {
                ticket: CommandTicket(1),
                error: ApiError::Network("offline".to_string()),
            },
        );
        assert_eq!(
            effects,
            vec![RuntimeEffect::LoadIcons {
                ticket: Some(CommandTicket(1)),
            }]
        );
        assert_eq!(
            state.command(CommandTicket(1)).map(|record| record.phase),
            Some(CommandPhase::Resyncing)
        );

        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::IconsLoaded {
                ticket: Some(CommandTicket(1)),
                result: Err(ApiError::Network("still offline".to_string())),
            },
        );
        assert!(state.is_idle());
    }

    #[test]
    fn resize_applies_preset_and_persists_current_position() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 20, 30)]);

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::IconCommand {
                icon_id: IconId::from("1"),
                command: IconCommand::Resize(ResizePreset::Large),
            },
        );

        assert_eq!(
            effects,
            vec![RuntimeEffect::PersistGeometry {
                ticket: CommandTicket(1),
                icon_id: IconId::from("1"),
                position: IconPosition::new(20, 30),
                size: 96,
            }]
        );
        let icon = state.icons.get(&IconId::from("1")).expect("icon");
        assert_eq!((icon.width, icon.height), (Some(96), Some(96)));
    }

    #[test]
    fn delete_removes_locally_and_closes_icon_menu() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 0, 0), icon_at("2", 0, 0)]);
        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::OpenIconMenu {
                icon_id: IconId::from("1"),
                pointer: IconPosition::new(10, 10),
                surface: SurfaceSize::default(),
            },
        );

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::IconCommand {
                icon_id: IconId::from("1"),
                command: IconCommand::Delete,
            },
        );

        assert_eq!(
            effects,
            vec![RuntimeEffect::DeleteIcon {
                ticket: CommandTicket(1),
                icon_id: IconId::from("1"),
            }]
        );
        assert_eq!(state.icons.len(), 1);
        assert_eq!(state.context_menu, ContextMenuState::Hidden);
    }

    #[test]
    fn oversized_image_sets_notice_without_effects() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 0, 0)]);
        let before = state.icons.clone();

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::IconImagePicked {
                icon_id: IconId::from("1"),
                image: PickedIconImage {
                    file_name: "huge.png".to_string(),
                    mime_type: "image/png".to_string(),
                    size_bytes: 200 * 1024,
                    data_url: None,
                },
            },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(state.icons, before);
        assert_eq!(
            state.notice.as_deref(),
            Some("Image too large. Please choose a file under 100 KB.")
        );
    }

    #[test]
    fn shortcut_validation_error_stays_in_dialog() {
        let (mut state, mut interaction) = signed_in(Vec::new());
        reduce(&mut state, &mut interaction, DesktopAction::OpenShortcutDialog);

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::SubmitShortcut {
                name: " ".to_string(),
                url: "docs.rs".to_string(),
                surface_width: 1024,
            },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(
            state.shortcut_dialog,
            ShortcutDialogState::Editing {
                error: Some("Please enter a name and URL.".to_string()),
            }
        );
    }

    #[test]
    fn create_failure_reports_backend_message_in_dialog() {
        let (mut state, mut interaction) = signed_in(Vec::new());
        reduce(&mut state, &mut interaction, DesktopAction::OpenShortcutDialog);
        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::SubmitShortcut {
                name: "Docs".to_string(),
                url: "docs.rs".to_string(),
                surface_width: 1024,
            },
        );
        assert!(matches!(
            effects.as_slice(),
            [RuntimeEffect::CreateIcon { ticket: CommandTicket(1), .. }]
        ));
        assert_eq!(state.shortcut_dialog, ShortcutDialogState::Submitting);

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::CommandFailed {
                ticket: CommandTicket(1),
                error: ApiError::Rejected {
                    status: 400,
                    message: "url is invalid".to_string(),
                },
            },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(
            state.shortcut_dialog,
            ShortcutDialogState::Editing {
                error: Some("url is invalid".to_string()),
            }
        );
        assert!(state.icons.is_empty());
        assert!(state.is_idle());
    }

    #[test]
    fn auto_arrange_applies_grid_in_list_order() {
        let (mut state, mut interaction) =
            signed_in(vec![icon_at("1", 500, 500), icon_at("2", 7, 7)]);

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::AutoArrange { surface_width: 300 },
        );

        let placements = vec![
            (IconId::from("1"), IconPosition::new(12, 12)),
            (IconId::from("2"), IconPosition::new(132, 12)),
        ];
        assert_eq!(
            effects,
            vec![RuntimeEffect::PersistArrangement {
                ticket: CommandTicket(1),
                placements,
            }]
        );
        assert_eq!(
            state
                .icons
                .iter()
                .map(|icon| icon.position)
                .collect::<Vec<_>>(),
            vec![IconPosition::new(12, 12), IconPosition::new(132, 12)]
        );
    }

    #[test]
    fn unauthorized_failure_signs_out_without_retry() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 0, 0)]);
        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::IconCommand {
                icon_id: IconId::from("1"),
                command: IconCommand::Delete,
            },
        );

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::CommandFailed {
                ticket: CommandTicket(1),
                error: ApiError::Unauthorized,
            },
        );

        assert_eq!(effects, Vec::new());
        assert_eq!(
            state.session,
            SessionState::SignedOut {
                error: Some("Your session has expired. Please sign in again.".to_string()),
            }
        );
        assert!(state.icons.is_empty());
        assert!(state.is_idle());
    }

    #[test]
    fn blank_login_is_rejected_before_any_request() {
        let mut state = DesktopState {
            session: SessionState::SignedOut { error: None },
            ..DesktopState::default()
        };
        let mut interaction = InteractionState::default();

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::SubmitLogin {
                username: "   ".to_string(),
                password: "secret".to_string(),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(
            state.session,
            SessionState::SignedOut {
                error: Some("Please enter a username and password.".to_string()),
            }
        );

        let effects = reduce(
            &mut state,
            &mut interaction,
            DesktopAction::SubmitLogin {
                username: " ada ".to_string(),
                password: "secret".to_string(),
            },
        );
        assert_eq!(
            effects,
            vec![RuntimeEffect::Login(LoginRequest {
                username: "ada".to_string(),
                password: "secret".to_string(),
            })]
        );
        assert_eq!(state.session, SessionState::SigningIn);
    }

    #[test]
    fn registration_validates_then_returns_to_sign_in() {
        let mut state = DesktopState {
            session: SessionState::SignedOut { error: None },
            ..DesktopState::default()
        };
        let mut interaction = InteractionState::default();
        let submit = |email: &str| DesktopAction::SubmitRegistration {
            username: "grace".to_string(),
            password: "cobol".to_string(),
            email: email.to_string(),
        };

        reduce(&mut state, &mut interaction, DesktopAction::ShowRegistration);
        assert_eq!(state.session, SessionState::Registering { error: None });

        assert!(reduce(&mut state, &mut interaction, submit(" ")).is_empty());
        assert_eq!(
            state.session,
            SessionState::Registering {
                error: Some("Please fill in all fields.".to_string()),
            }
        );

        let effects = reduce(&mut state, &mut interaction, submit("grace@example.com"));
        assert_eq!(
            effects,
            vec![RuntimeEffect::Register(RegisterRequest {
                username: "grace".to_string(),
                password: "cobol".to_string(),
                email: "grace@example.com".to_string(),
            })]
        );
        assert!(state.session.is_busy());

        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::RegistrationFailed {
                message: "Username already exists".to_string(),
            },
        );
        assert_eq!(
            state.session,
            SessionState::Registering {
                error: Some("Username already exists".to_string()),
            }
        );

        reduce(&mut state, &mut interaction, submit("grace@example.com"));
        reduce(&mut state, &mut interaction, DesktopAction::Registered);
        assert_eq!(state.session, SessionState::SignedOut { error: None });
    }

    #[test]
    fn menus_are_exclusive_and_escape_closes_everything() {
        let (mut state, mut interaction) = signed_in(vec![icon_at("1", 0, 0)]);
        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::OpenDesktopMenu {
                pointer: IconPosition::new(5, 6),
                surface: SurfaceSize::default(),
            },
        );
        assert_eq!(
            state.context_menu,
            ContextMenuState::Desktop {
                at: MenuPlacement {
                    x: 5,
                    y: 6,
                    submenu_left: false,
                },
            }
        );
        reduce(
            &mut state,
            &mut interaction,
            DesktopAction::OpenIconMenu {
                icon_id: IconId::from("1"),
                pointer: IconPosition::new(5, 6),
                surface: SurfaceSize::default(),
            },
        );
        assert!(matches!(state.context_menu, ContextMenuState::Icon { .. }));

        reduce(&mut state, &mut interaction, DesktopAction::OpenShortcutDialog);
        assert_eq!(state.context_menu, ContextMenuState::Hidden);
        reduce(&mut state, &mut interaction, DesktopAction::Escape);
        assert_eq!(state.shortcut_dialog, ShortcutDialogState::Hidden);
    }

    #[test]
    fn unknown_icon_is_reported() {
        let (mut state, mut interaction) = signed_in(Vec::new());
        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::IconClicked {
                icon_id: IconId::from("ghost"),
            },
        )
        .expect_err("missing icon");
        assert_eq!(err, ReducerError::IconNotFound(IconId::from("ghost")));
    }
}
