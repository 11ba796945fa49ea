//! New-shortcut validation and request construction.

use platform_host::CreateDesktopItemRequest;
use thiserror::Error;

use crate::{config::DesktopIconConfig, layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Reasons a shortcut form is rejected before any request is sent.
pub enum ShortcutValidationError {
    /// The name is blank.
    #[error("Please enter a name and URL.")]
    MissingName,
    /// The URL is blank.
    #[error("Please enter a name and URL.")]
    MissingUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Trimmed shortcut fields with a normalized URL.
pub struct ValidShortcut {
    pub name: String,
    pub url: String,
}

/// Prefixes `https://` unless the URL already names an `http` or `https` scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Validates raw form input.
///
/// # Errors
///
/// Returns [`ShortcutValidationError`] when the name or URL is blank after trimming.
pub fn validate_shortcut(name: &str, url: &str) -> Result<ValidShortcut, ShortcutValidationError> {
    let name = name.trim();
    let url = url.trim();
    if name.is_empty() {
        return Err(ShortcutValidationError::MissingName);
    }
    if url.is_empty() {
        return Err(ShortcutValidationError::MissingUrl);
    }
    Ok(ValidShortcut {
        name: name.to_string(),
        url: normalize_url(url),
    })
}

/// Builds the create request for a shortcut placed in the next free grid slot.
pub fn create_request(
    shortcut: ValidShortcut,
    icon_count: usize,
    surface_width: i32,
    config: &DesktopIconConfig,
) -> CreateDesktopItemRequest {
    let position = layout::new_shortcut_position(icon_count, surface_width, &config.grid);
    CreateDesktopItemRequest {
        name: shortcut.name,
        url: shortcut.url,
        icon: config.icon.default_asset.clone(),
        width: Some(config.new_shortcut.width),
        height: Some(config.new_shortcut.height),
        pos_x: Some(position.x),
        pos_y: Some(position.y),
    }
}
