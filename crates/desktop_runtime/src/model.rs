use std::fmt;

use platform_host::DesktopItemRecord;
use serde::{Deserialize, Serialize};

use crate::{config::IconSizingConfig, drag::DragController, layout::MenuPlacement};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Server-assigned shortcut identifier, kept opaque.
pub struct IconId(pub String);

impl IconId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IconId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IconPosition {
    pub x: i32,
    pub y: i32,
}

impl IconPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offsets the position, never leaving the surface's top-left quadrant.
    pub fn offset_clamped(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx).max(0),
            y: self.y.saturating_add(dy).max(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopIcon {
    pub id: IconId,
    pub name: String,
    pub url: String,
    /// Built-in asset path or `data:` URI; `None` renders the default asset.
    pub image: Option<String>,
    /// Stored image width; may be out of range, see [`crate::layout::image_size`].
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub position: IconPosition,
    pub created_at: Option<String>,
}

impl DesktopIcon {
    /// Builds an icon from a server row, defaulting the position when unset.
    pub fn from_record(record: DesktopItemRecord, sizing: &IconSizingConfig) -> Self {
        Self {
            id: IconId(record.id),
            name: record.name,
            url: record.url,
            image: record.icon.filter(|icon| !icon.trim().is_empty()),
            width: record.width,
            height: record.height,
            position: IconPosition {
                x: record.pos_x.unwrap_or(sizing.default_x),
                y: record.pos_y.unwrap_or(sizing.default_y),
            },
            created_at: record.created_at,
        }
    }

    pub fn image_src<'a>(&'a self, sizing: &'a IconSizingConfig) -> &'a str {
        self.image.as_deref().unwrap_or(&sizing.default_asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Local, unconfirmed changes to one icon. Absent fields are left untouched.
pub struct IconPatch {
    pub position: Option<IconPosition>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub image: Option<String>,
}

impl IconPatch {
    pub fn position(position: IconPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Square image size, stored in both width and height.
    pub fn size(size: i32) -> Self {
        Self {
            width: Some(size),
            height: Some(size),
            ..Self::default()
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    fn apply_to(self, icon: &mut DesktopIcon) {
        if let Some(position) = self.position {
            icon.position = position;
        }
        if let Some(width) = self.width {
            icon.width = Some(width);
        }
        if let Some(height) = self.height {
            icon.height = Some(height);
        }
        if let Some(image) = self.image {
            icon.image = Some(image);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Ordered icon collection of the signed-in user.
///
/// The model is a read-through cache of the server list: it is only ever filled from server rows,
/// so every icon it holds carries a server-assigned id.
pub struct IconModel {
    icons: Vec<DesktopIcon>,
}

impl IconModel {
    /// Replaces the whole collection with a freshly fetched list (resync).
    pub fn replace_all(&mut self, icons: Vec<DesktopIcon>) {
        self.icons = icons;
    }

    /// Applies an unconfirmed local change. Returns `false` when the icon is gone.
    pub fn apply_local(&mut self, id: &IconId, patch: IconPatch) -> bool {
        match self.icons.iter_mut().find(|icon| &icon.id == id) {
            Some(icon) => {
                patch.apply_to(icon);
                true
            }
            None => false,
        }
    }

    /// Removes an icon ahead of server confirmation.
    pub fn remove(&mut self, id: &IconId) -> Option<DesktopIcon> {
        let index = self.icons.iter().position(|icon| &icon.id == id)?;
        Some(self.icons.remove(index))
    }

    pub fn clear(&mut self) {
        self.icons.clear();
    }

    pub fn get(&self, id: &IconId) -> Option<&DesktopIcon> {
        self.icons.iter().find(|icon| &icon.id == id)
    }

    pub fn contains(&self, id: &IconId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesktopIcon> {
        self.icons.iter()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Owned copy of the current list, in display order.
    pub fn snapshot(&self) -> Vec<DesktopIcon> {
        self.icons.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifies one in-flight command.
pub struct CommandTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Move,
    Resize,
    Delete,
    Create,
    ChangeImage,
    Arrange,
}

impl CommandKind {
    /// Whether a failure of this command is recovered by reloading the icon list.
    pub const fn resyncs_on_failure(self) -> bool {
        matches!(self, Self::Move | Self::Resize | Self::Delete)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::ChangeImage => "change icon",
            Self::Arrange => "auto arrange",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandPhase {
    /// The mutation request is in flight.
    Executing,
    /// The mutation failed and a full reload is in flight.
    Resyncing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub ticket: CommandTicket,
    pub kind: CommandKind,
    pub icon_id: Option<IconId>,
    pub phase: CommandPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContextMenuState {
    #[default]
    Hidden,
    Desktop {
        at: MenuPlacement,
    },
    Icon {
        icon_id: IconId,
        at: MenuPlacement,
    },
}

impl ContextMenuState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShortcutDialogState {
    #[default]
    Hidden,
    Editing {
        error: Option<String>,
    },
    Submitting,
}

impl ShortcutDialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IconLayerVisibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Checking,
    SignedOut {
        error: Option<String>,
    },
    SigningIn,
    /// The account-creation form is shown instead of the sign-in form.
    Registering {
        error: Option<String>,
    },
    SubmittingRegistration,
    SignedIn {
        username: String,
    },
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    /// A request is in flight and the sign-in overlay inputs are locked.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Checking | Self::SigningIn | Self::SubmittingRegistration
        )
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::SignedIn { username } => Some(username),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesktopState {
    pub icons: IconModel,
    pub commands: Vec<CommandRecord>,
    pub next_ticket: u64,
    pub context_menu: ContextMenuState,
    pub shortcut_dialog: ShortcutDialogState,
    pub icon_layer: IconLayerVisibility,
    pub session: SessionState,
    pub background_url: Option<String>,
    pub notice: Option<String>,
}

impl DesktopState {
    /// Registers a new in-flight command and returns its ticket.
    pub fn begin_command(&mut self, kind: CommandKind, icon_id: Option<IconId>) -> CommandTicket {
        self.next_ticket += 1;
        let ticket = CommandTicket(self.next_ticket);
        self.commands.push(CommandRecord {
            ticket,
            kind,
            icon_id,
            phase: CommandPhase::Executing,
        });
        ticket
    }

    pub fn command(&self, ticket: CommandTicket) -> Option<&CommandRecord> {
        self.commands.iter().find(|record| record.ticket == ticket)
    }

    pub fn command_mut(&mut self, ticket: CommandTicket) -> Option<&mut CommandRecord> {
        self.commands.iter_mut().find(|record| record.ticket == ticket)
    }

    /// Forgets a command, returning it to idle.
    pub fn finish_command(&mut self, ticket: CommandTicket) -> Option<CommandRecord> {
        let index = self
            .commands
            .iter()
            .position(|record| record.ticket == ticket)?;
        Some(self.commands.remove(index))
    }

    pub fn is_idle(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Pointer interaction state, kept apart from [`DesktopState`] so drags do not churn it.
pub struct InteractionState {
    pub drag: DragController,
}
