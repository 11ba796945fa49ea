//! Icon sizing, grid placement, and popup placement helpers shared by the reducer and the UI.

use serde::{Deserialize, Serialize};

use crate::{
    config::{ContextMenuConfig, GridConfig, IconSizingConfig, ResizeConfig},
    model::{DesktopIcon, IconId, IconPosition},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Desktop surface dimensions in CSS pixels.
pub struct SurfaceSize {
    pub width: i32,
    pub height: i32,
}

impl SurfaceSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Rendered geometry of one icon.
pub struct IconFootprint {
    /// Square image edge.
    pub image: i32,
    /// Container width, including room for the label.
    pub width: i32,
    /// Container height, including the label line.
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizePreset {
    Small,
    Medium,
    Large,
}

impl ResizePreset {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    pub const fn image_size(self, presets: &ResizeConfig) -> i32 {
        match self {
            Self::Small => presets.small,
            Self::Medium => presets.medium,
            Self::Large => presets.large,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Resolved context-menu origin relative to the desktop surface.
pub struct MenuPlacement {
    pub x: i32,
    pub y: i32,
    /// Nested submenus open to the left because the menu was pushed off the right edge.
    pub submenu_left: bool,
}

/// Image edge for `icon`: the stored width when valid, else the stored height, else the default.
pub fn image_size(icon: &DesktopIcon, sizing: &IconSizingConfig) -> i32 {
    let valid = sizing.min_image_size..=sizing.max_image_size;
    icon.width
        .filter(|width| valid.contains(width))
        .or_else(|| icon.height.filter(|height| valid.contains(height)))
        .unwrap_or(sizing.default_image_size)
}

pub fn icon_footprint(icon: &DesktopIcon, sizing: &IconSizingConfig) -> IconFootprint {
    let image = image_size(icon, sizing);
    IconFootprint {
        image,
        width: image.max(sizing.min_container_width),
        height: image + sizing.label_allowance,
    }
}

/// Number of grid columns that fit in `surface_width`; never less than one.
pub fn grid_columns(surface_width: i32, grid: &GridConfig) -> i32 {
    let usable = surface_width - 2 * grid.margin;
    let stride = grid.cell_width + grid.gap_x;
    if usable <= 0 || stride <= 0 {
        return 1;
    }
    (usable / stride).max(1)
}

/// Top-left corner of grid slot `index`, filling rows left to right.
pub fn grid_position(index: usize, columns: i32, grid: &GridConfig) -> IconPosition {
    let columns = columns.max(1) as usize;
    let col = (index % columns) as i32;
    let row = (index / columns) as i32;
    IconPosition::new(
        grid.margin + col * (grid.cell_width + grid.gap_x),
        grid.margin + row * (grid.cell_height + grid.gap_y),
    )
}

/// Slot assigned to a shortcut created while `icon_count` icons exist.
pub fn new_shortcut_position(
    icon_count: usize,
    surface_width: i32,
    grid: &GridConfig,
) -> IconPosition {
    grid_position(icon_count, grid_columns(surface_width, grid), grid)
}

/// Grid placement for every icon, in list order.
///
/// The result depends only on the order of `icons` and the surface width.
pub fn auto_arrange_positions<'a>(
    icons: impl IntoIterator<Item = &'a DesktopIcon>,
    surface_width: i32,
    grid: &GridConfig,
) -> Vec<(IconId, IconPosition)> {
    let columns = grid_columns(surface_width, grid);
    icons
        .into_iter()
        .enumerate()
        .map(|(index, icon)| (icon.id.clone(), grid_position(index, columns, grid)))
        .collect()
}

/// Places a context menu opened at `pointer` so its footprint stays inside `surface`.
pub fn place_context_menu(
    pointer: IconPosition,
    surface: SurfaceSize,
    menu: &ContextMenuConfig,
) -> MenuPlacement {
    let mut placement = MenuPlacement {
        x: pointer.x,
        y: pointer.y,
        submenu_left: false,
    };

    let right = pointer.x + menu.width;
    if right > surface.width {
        placement.x -= right - surface.width + menu.edge_padding;
        placement.submenu_left = true;
    }
    let bottom = pointer.y + menu.height;
    if bottom > surface.height {
        placement.y -= bottom - surface.height + menu.edge_padding;
    }

    placement.x = placement.x.max(0);
    placement.y = placement.y.max(0);
    placement
}
