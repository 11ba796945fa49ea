//! Per-icon drag recognition for mouse and touch input.
//!
//! Every icon that is being pressed, dragged, or still owes a suppressed click has an explicit
//! context in [`DragController`]. A press arms the context; only movement beyond the configured
//! threshold turns it into a drag. Releasing a drag arms a one-shot flag that swallows the click
//! the browser fires right after, so a drag never doubles as "open".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{IconId, IconPosition};

/// `MouseEvent.button` value of the primary button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerDevice {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Viewport pointer coordinates.
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// A press on an icon.
pub struct PointerDown {
    pub device: PointerDevice,
    /// Mouse button; ignored for touch.
    pub button: i16,
    /// Active touches; ignored for mouse.
    pub touch_count: u32,
    pub pointer: PointerPosition,
}

impl PointerDown {
    pub const fn mouse(button: i16, pointer: PointerPosition) -> Self {
        Self {
            device: PointerDevice::Mouse,
            button,
            touch_count: 0,
            pointer,
        }
    }

    pub const fn touch(touch_count: u32, pointer: PointerPosition) -> Self {
        Self {
            device: PointerDevice::Touch,
            button: PRIMARY_BUTTON,
            touch_count,
            pointer,
        }
    }

    fn starts_drag(&self) -> bool {
        match self.device {
            PointerDevice::Mouse => self.button == PRIMARY_BUTTON,
            PointerDevice::Touch => self.touch_count == 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pressed, not yet moved past the threshold.
    Armed {
        device: PointerDevice,
        pointer_start: PointerPosition,
        origin: IconPosition,
    },
    /// Following the pointer.
    Dragging {
        device: PointerDevice,
        pointer_start: PointerPosition,
        origin: IconPosition,
        current: IconPosition,
    },
}

impl DragPhase {
    fn device(&self) -> Option<PointerDevice> {
        match self {
            Self::Idle => None,
            Self::Armed { device, .. } | Self::Dragging { device, .. } => Some(*device),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct IconDragContext {
    phase: DragPhase,
    suppress_next_click: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of releasing a pointer.
pub enum DragRelease {
    /// No icon was pressed with this device.
    None,
    /// The press never became a drag; the click proceeds.
    Released { icon_id: IconId },
    /// A drag ended at `position`, which should be persisted.
    Dropped {
        icon_id: IconId,
        position: IconPosition,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Drag contexts keyed by icon id.
pub struct DragController {
    contexts: HashMap<IconId, IconDragContext>,
}

impl DragController {
    pub fn phase(&self, icon_id: &IconId) -> DragPhase {
        self.contexts
            .get(icon_id)
            .map(|context| context.phase)
            .unwrap_or_default()
    }

    /// Icon currently pressed or dragged with `device`.
    pub fn active_icon(&self, device: PointerDevice) -> Option<&IconId> {
        self.contexts
            .iter()
            .find(|(_, context)| context.phase.device() == Some(device))
            .map(|(icon_id, _)| icon_id)
    }

    /// Arms a drag for `icon_id` starting from its current `origin`.
    ///
    /// Returns `false` when the press is ignored: a secondary button, a multi-touch start, or a
    /// device that already drives another icon.
    pub fn pointer_down(
        &mut self,
        icon_id: IconId,
        origin: IconPosition,
        input: PointerDown,
    ) -> bool {
        if !input.starts_drag() || self.active_icon(input.device).is_some() {
            return false;
        }
        let context = self.contexts.entry(icon_id).or_default();
        if context.phase != DragPhase::Idle {
            return false;
        }
        // A drop that never produced a click must not swallow this press's click.
        context.suppress_next_click = false;
        context.phase = DragPhase::Armed {
            device: input.device,
            pointer_start: input.pointer,
            origin,
        };
        true
    }

    /// Tracks pointer movement and returns the icon position to apply, if any.
    pub fn pointer_move(
        &mut self,
        device: PointerDevice,
        pointer: PointerPosition,
        threshold_px: f64,
    ) -> Option<(IconId, IconPosition)> {
        let (icon_id, context) = self
            .contexts
            .iter_mut()
            .find(|(_, context)| context.phase.device() == Some(device))?;

        let (pointer_start, origin, previous) = match context.phase {
            DragPhase::Idle => return None,
            DragPhase::Armed {
                pointer_start,
                origin,
                ..
            } => (pointer_start, origin, None),
            DragPhase::Dragging {
                pointer_start,
                origin,
                current,
                ..
            } => (pointer_start, origin, Some(current)),
        };

        let dx = pointer.x - pointer_start.x;
        let dy = pointer.y - pointer_start.y;
        if previous.is_none() && f64::from(dx).hypot(f64::from(dy)) <= threshold_px {
            return None;
        }

        let current = origin.offset_clamped(dx, dy);
        context.phase = DragPhase::Dragging {
            device,
            pointer_start,
            origin,
            current,
        };
        (previous != Some(current)).then(|| (icon_id.clone(), current))
    }

    /// Ends the press or drag driven by `device`.
    pub fn pointer_up(&mut self, device: PointerDevice) -> DragRelease {
        let Some(icon_id) = self.active_icon(device).cloned() else {
            return DragRelease::None;
        };
        let Some(context) = self.contexts.get_mut(&icon_id) else {
            return DragRelease::None;
        };

        let phase = std::mem::take(&mut context.phase);
        match phase {
            DragPhase::Dragging { current, .. } => {
                context.suppress_next_click = true;
                DragRelease::Dropped {
                    icon_id,
                    position: current,
                }
            }
            _ => {
                if !context.suppress_next_click {
                    self.contexts.remove(&icon_id);
                }
                DragRelease::Released { icon_id }
            }
        }
    }

    /// Consumes the click that follows a drop. Returns `true` when the click must be ignored.
    pub fn consume_click(&mut self, icon_id: &IconId) -> bool {
        let Some(context) = self.contexts.get_mut(icon_id) else {
            return false;
        };
        let suppressed = std::mem::take(&mut context.suppress_next_click);
        if context.phase == DragPhase::Idle {
            self.contexts.remove(icon_id);
        }
        suppressed
    }

    /// Drops contexts of icons that no longer exist.
    pub fn retain_icons(&mut self, mut exists: impl FnMut(&IconId) -> bool) {
        self.contexts.retain(|icon_id, _| exists(icon_id));
    }

    pub fn is_idle(&self) -> bool {
        self.contexts
            .values()
            .all(|context| context.phase == DragPhase::Idle)
    }
}
