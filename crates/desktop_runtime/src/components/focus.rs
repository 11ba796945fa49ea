//! DOM focus and menu-keyboard helpers for desktop overlays.

use wasm_bindgen::JsCast;

fn html_element_by_id(id: &str) -> Option<web_sys::HtmlElement> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
}

fn active_element_id() -> String {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.active_element())
        .map(|element| element.id())
        .unwrap_or_default()
}

/// Focuses an element by ID and reports whether it was found.
pub(super) fn focus_element_by_id(id: &str) -> bool {
    match html_element_by_id(id) {
        Some(element) => {
            let _ = element.focus();
            true
        }
        None => false,
    }
}

fn menu_items(menu_id: &str) -> Vec<web_sys::HtmlElement> {
    let Some(menu) = html_element_by_id(menu_id) else {
        return Vec::new();
    };
    let Ok(nodes) = menu.query_selector_all(r#"[role="menuitem"]"#) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .filter(|item| item.get_attribute("aria-disabled").as_deref() != Some("true"))
        .collect()
}

/// Focuses the first enabled item of a menu.
pub(super) fn focus_first_menu_item(menu_id: &str) -> bool {
    match menu_items(menu_id).first() {
        Some(first) => {
            let _ = first.focus();
            true
        }
        None => false,
    }
}

fn focus_menu_item_relative(menu_id: &str, delta: i32) -> bool {
    let items = menu_items(menu_id);
    if items.is_empty() {
        return false;
    }

    let active_id = active_element_id();
    let current_index = items
        .iter()
        .position(|item| !active_id.is_empty() && item.id() == active_id)
        .unwrap_or(0);
    let len = items.len() as i32;
    let next_index = (current_index as i32 + delta).rem_euclid(len) as usize;
    let _ = items[next_index].focus();
    true
}

/// Handles arrow-key menu navigation and prevents default when handled.
pub(super) fn handle_menu_roving_keydown(ev: &web_sys::KeyboardEvent, menu_id: &str) -> bool {
    let handled = match ev.key().as_str() {
        "ArrowDown" => focus_menu_item_relative(menu_id, 1),
        "ArrowUp" => focus_menu_item_relative(menu_id, -1),
        _ => false,
    };

    if handled {
        ev.prevent_default();
        ev.stop_propagation();
    }
    handled
}
