//! Browser file picker for icon artwork.

use platform_host::{IconImageFuture, IconImagePicker, PickedIconImage};

#[cfg(target_arch = "wasm32")]
use futures::channel::oneshot;
#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[derive(Debug, Clone, Copy, Default)]
/// Hidden `<input type="file" accept="image/*">` picker.
pub struct WebIconImagePicker;

impl IconImagePicker for WebIconImagePicker {
    fn pick_icon_image<'a>(
        &'a self,
        max_bytes: u64,
    ) -> IconImageFuture<'a, Result<Option<PickedIconImage>, String>> {
        Box::pin(async move { pick_image(max_bytes).await })
    }
}

async fn pick_image(max_bytes: u64) -> Result<Option<PickedIconImage>, String> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = max_bytes;
        Err("icon image picking is only available when compiled for wasm32".to_string())
    }

    #[cfg(target_arch = "wasm32")]
    {
        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let document = window
            .document()
            .ok_or_else(|| "document unavailable".to_string())?;
        let input = document
            .create_element("input")
            .map_err(|err| format!("failed to create file input: {err:?}"))?
            .dyn_into::<web_sys::HtmlInputElement>()
            .map_err(|_| "failed to cast file input".to_string())?;
        input.set_type("file");
        input.set_accept("image/*");
        input.set_hidden(true);

        if let Some(body) = document.body() {
            let _ = body.append_child(&input);
        }

        let (tx, rx) = oneshot::channel::<Option<web_sys::File>>();
        let sender = Rc::new(RefCell::new(Some(tx)));
        let input_for_change = input.clone();
        let change_sender = sender.clone();
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
            let file = input_for_change.files().and_then(|files| files.get(0));
            if let Some(tx) = change_sender.borrow_mut().take() {
                let _ = tx.send(file);
            }
        }));
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
        input.click();

        let picked = rx
            .await
            .map_err(|_| "icon picker was cancelled".to_string())?;
        input.remove();
        on_change.forget();

        let Some(file) = picked else {
            return Ok(None);
        };
        let size_bytes = file.size().max(0.0) as u64;
        // Oversized files are reported without reading them.
        let data_url = if size_bytes > max_bytes {
            None
        } else {
            Some(read_file_as_data_url(&file).await?)
        };
        Ok(Some(PickedIconImage {
            file_name: file.name(),
            mime_type: file.type_(),
            size_bytes,
            data_url,
        }))
    }
}

#[cfg(target_arch = "wasm32")]
async fn read_file_as_data_url(file: &web_sys::File) -> Result<String, String> {
    let reader = web_sys::FileReader::new().map_err(|err| format!("{err:?}"))?;
    let (tx, rx) = oneshot::channel::<Result<String, String>>();
    let sender = Rc::new(RefCell::new(Some(tx)));

    let reader_for_load = reader.clone();
    let load_sender = sender.clone();
    let on_load = Closure::<dyn FnMut(web_sys::ProgressEvent)>::wrap(Box::new(move |_| {
        let result = reader_for_load
            .result()
            .map_err(|err| format!("failed to read icon image: {err:?}"))
            .and_then(|value| {
                value
                    .as_string()
                    .ok_or_else(|| "file reader returned non-string result".to_string())
            });
        if let Some(tx) = load_sender.borrow_mut().take() {
            let _ = tx.send(result);
        }
    }));
    reader.set_onload(Some(on_load.as_ref().unchecked_ref()));

    let error_sender = sender;
    let on_error = Closure::<dyn FnMut(web_sys::ProgressEvent)>::wrap(Box::new(move |_| {
        if let Some(tx) = error_sender.borrow_mut().take() {
            let _ = tx.send(Err("failed to load icon image".to_string()));
        }
    }));
    reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    reader
        .read_as_data_url(file)
        .map_err(|err| format!("failed to start file read: {err:?}"))?;

    let result = rx
        .await
        .map_err(|_| "icon image read was interrupted".to_string())?;
    on_load.forget();
    on_error.forget();
    result
}
