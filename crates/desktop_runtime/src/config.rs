//! Bundled desktop icon configuration.
//!
//! `desktop_icons.toml` is validated by `build.rs` and embedded as JSON; this module parses it once
//! and falls back to compiled defaults (with a logged warning) if the embedded payload is unusable.

use std::sync::OnceLock;

use leptos::logging;
use serde::{Deserialize, Serialize};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/desktop_icon_config_generated.rs"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Auto-arrange grid geometry in CSS pixels.
pub struct GridConfig {
    /// Offset of the first cell from the surface's top-left corner.
    pub margin: i32,
    /// Horizontal gap between cells.
    pub gap_x: i32,
    /// Vertical gap between cells.
    pub gap_y: i32,
    /// Cell width.
    pub cell_width: i32,
    /// Cell height.
    pub cell_height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Icon rendering defaults and limits.
pub struct IconSizingConfig {
    /// Asset shown when an icon has no image.
    pub default_asset: String,
    /// Image edge used when the stored size is absent or out of range.
    pub default_image_size: i32,
    /// Smallest stored size treated as valid.
    pub min_image_size: i32,
    /// Largest stored size treated as valid.
    pub max_image_size: i32,
    /// Minimum container width, so labels have room under small images.
    pub min_container_width: i32,
    /// Extra container height reserved for the label.
    pub label_allowance: i32,
    /// Left offset used when an icon has no stored position.
    pub default_x: i32,
    /// Top offset used when an icon has no stored position.
    pub default_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Drag recognition settings.
pub struct DragConfig {
    /// Displacement that must be exceeded before a press becomes a drag.
    pub threshold_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Icon artwork upload limits.
pub struct UploadConfig {
    /// Largest accepted image file.
    pub max_image_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Stored size of newly created shortcuts.
pub struct NewShortcutConfig {
    /// Stored width.
    pub width: i32,
    /// Stored height.
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Image edge of each resize preset.
pub struct ResizeConfig {
    /// Small preset.
    pub small: i32,
    /// Medium preset.
    pub medium: i32,
    /// Large preset.
    pub large: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Context-menu footprint used for viewport placement.
pub struct ContextMenuConfig {
    /// Estimated menu width.
    pub width: i32,
    /// Estimated menu height.
    pub height: i32,
    /// Distance kept from the viewport edge when a menu is shifted.
    pub edge_padding: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Complete desktop icon configuration.
pub struct DesktopIconConfig {
    /// Manifest schema version.
    pub schema_version: u32,
    /// Auto-arrange grid.
    pub grid: GridConfig,
    /// Rendering defaults.
    pub icon: IconSizingConfig,
    /// Drag recognition.
    pub drag: DragConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// New shortcut size.
    pub new_shortcut: NewShortcutConfig,
    /// Resize presets.
    pub resize: ResizeConfig,
    /// Context-menu placement.
    pub context_menu: ContextMenuConfig,
}

impl Default for DesktopIconConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            grid: GridConfig {
                margin: 12,
                gap_x: 24,
                gap_y: 12,
                cell_width: 96,
                cell_height: 120,
            },
            icon: IconSizingConfig {
                default_asset: "/icons/website.png".to_string(),
                default_image_size: 48,
                min_image_size: 24,
                max_image_size: 256,
                min_container_width: 72,
                label_allowance: 22,
                default_x: 12,
                default_y: 12,
            },
            drag: DragConfig { threshold_px: 4.0 },
            upload: UploadConfig {
                max_image_bytes: 100 * 1024,
            },
            new_shortcut: NewShortcutConfig {
                width: 72,
                height: 92,
            },
            resize: ResizeConfig {
                small: 48,
                medium: 72,
                large: 96,
            },
            context_menu: ContextMenuConfig {
                width: 200,
                height: 170,
                edge_padding: 8,
            },
        }
    }
}

/// Parses a configuration payload in the embedded JSON format.
///
/// # Errors
///
/// Returns an error string when the payload is malformed or has an unknown schema version.
pub fn parse_icon_config(json: &str) -> Result<DesktopIconConfig, String> {
    let config: DesktopIconConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
    if config.schema_version != 1 {
        return Err(format!(
            "unsupported desktop icon config schema {}",
            config.schema_version
        ));
    }
    Ok(config)
}

/// Returns the process-wide desktop icon configuration.
pub fn icon_config() -> &'static DesktopIconConfig {
    static CONFIG: OnceLock<DesktopIconConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        parse_icon_config(generated::DESKTOP_ICON_CONFIG_JSON).unwrap_or_else(|err| {
            logging::warn!("bundled desktop icon config rejected, using defaults: {err}");
            DesktopIconConfig::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bundled_config_matches_compiled_defaults() {
        assert_eq!(icon_config(), &DesktopIconConfig::default());
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let mut value = serde_json::to_value(DesktopIconConfig::default()).expect("serialize");
        value["schema_version"] = serde_json::json!(2);
        let err = parse_icon_config(&value.to_string()).expect_err("schema 2");
        assert!(err.contains("schema 2"));
    }
}
