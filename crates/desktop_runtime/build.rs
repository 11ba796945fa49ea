use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Grid {
    margin: i32,
    gap_x: i32,
    gap_y: i32,
    cell_width: i32,
    cell_height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Icon {
    default_asset: String,
    default_image_size: i32,
    min_image_size: i32,
    max_image_size: i32,
    min_container_width: i32,
    label_allowance: i32,
    default_x: i32,
    default_y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Drag {
    threshold_px: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Upload {
    max_image_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NewShortcut {
    width: i32,
    height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Resize {
    small: i32,
    medium: i32,
    large: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContextMenu {
    width: i32,
    height: i32,
    edge_padding: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DesktopIconManifest {
    schema_version: u32,
    grid: Grid,
    icon: Icon,
    drag: Drag,
    upload: Upload,
    new_shortcut: NewShortcut,
    resize: Resize,
    context_menu: ContextMenu,
}

fn validate(manifest: &DesktopIconManifest) -> Result<(), String> {
    if manifest.schema_version != 1 {
        return Err(format!(
            "schema mismatch: expected 1 found {}",
            manifest.schema_version
        ));
    }
    let grid = &manifest.grid;
    if grid.cell_width <= 0 || grid.cell_height <= 0 {
        return Err("grid cells must have a positive size".to_string());
    }
    if grid.margin < 0 || grid.gap_x < 0 || grid.gap_y < 0 {
        return Err("grid margin and gaps must not be negative".to_string());
    }
    let icon = &manifest.icon;
    let sizes = icon.min_image_size..=icon.max_image_size;
    if icon.min_image_size <= 0 || sizes.is_empty() {
        return Err("icon size range must be a non-empty positive range".to_string());
    }
    for (name, size) in [
        ("icon.default_image_size", icon.default_image_size),
        ("resize.small", manifest.resize.small),
        ("resize.medium", manifest.resize.medium),
        ("resize.large", manifest.resize.large),
    ] {
        if !sizes.contains(&size) {
            return Err(format!("{name} = {size} is outside {sizes:?}"));
        }
    }
    if !(manifest.resize.small < manifest.resize.medium
        && manifest.resize.medium < manifest.resize.large)
    {
        return Err("resize presets must grow from small to large".to_string());
    }
    if icon.default_asset.trim().is_empty() {
        return Err("icon.default_asset must not be empty".to_string());
    }
    if !manifest.drag.threshold_px.is_finite() || manifest.drag.threshold_px < 0.0 {
        return Err("drag.threshold_px must be a finite non-negative number".to_string());
    }
    if manifest.upload.max_image_bytes == 0 {
        return Err("upload.max_image_bytes must be positive".to_string());
    }
    Ok(())
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let path = crate_root.join("desktop_icons.toml");
    println!("cargo:rerun-if-changed={}", path.display());

    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let manifest: DesktopIconManifest = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    if let Err(err) = validate(&manifest) {
        panic!("invalid {}: {err}", path.display());
    }

    let json = serde_json::to_string_pretty(&manifest).expect("serialize desktop icon config");
    let generated = format!(
        "/// Build-time generated desktop icon configuration JSON.\n\
pub const DESKTOP_ICON_CONFIG_JSON: &str = r##\"{}\"##;\n",
        json
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("desktop_icon_config_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}
