//! Browser capability bridge for `platform_host_web` service adapters.
//!
//! This module contains the WASM/JS interop layer (credentialed `fetch`, `window.open`) and a
//! non-WASM fallback shim so the adapters stay testable natively.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Raw HTTP response surfaced by the bridge before status interpretation.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text (may be empty).
    #[serde(default)]
    pub body: String,
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::*;
    use js_sys::Promise;
    use serde::de::DeserializeOwned;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
async function httpRequest(method, url, body) {
  const init = { method, credentials: 'include', headers: {} };
  if (body !== null && body !== undefined) {
    init.headers['Content-Type'] = 'application/json';
    init.body = body;
  }
  const response = await fetch(url, init);
  let text = '';
  try {
    text = await response.text();
  } catch (_) {
    text = '';
  }
  return { status: response.status, body: text };
}

function openExternalUrl(url) {
  if (typeof window === 'undefined' || typeof window.open !== 'function') {
    throw new Error('window.open is unavailable');
  }
  window.open(url, '_blank');
  return null;
}

export async function jsHttpRequest(method, url, body) { return await httpRequest(method, url, body); }
export async function jsOpenExternalUrl(url) { return openExternalUrl(url); }
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsHttpRequest)]
        fn js_http_request(method: &str, url: &str, body: Option<String>) -> Promise;
        #[wasm_bindgen(js_name = jsOpenExternalUrl)]
        fn js_open_external_url(url: &str) -> Promise;
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    async fn promise_to_json<T: DeserializeOwned>(promise: Promise) -> Result<T, String> {
        let value = await_promise(promise).await?;
        from_value(value).map_err(|e| e.to_string())
    }

    pub async fn http_request(
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, String> {
        promise_to_json(js_http_request(method, url, body)).await
    }

    pub async fn open_external_url(url: &str) -> Result<(), String> {
        let _ = await_promise(js_open_external_url(url)).await?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    fn unsupported() -> String {
        "Browser network APIs are only available when compiled for wasm32".to_string()
    }

    pub async fn http_request(
        _method: &str,
        _url: &str,
        _body: Option<String>,
    ) -> Result<HttpResponse, String> {
        Err(unsupported())
    }

    pub async fn open_external_url(_url: &str) -> Result<(), String> {
        Err(unsupported())
    }
}

/// Sends one credentialed request; `body` is sent as JSON when present.
pub async fn http_request(
    method: &str,
    url: &str,
    body: Option<String>,
) -> Result<HttpResponse, String> {
    imp::http_request(method, url, body).await
}

pub async fn open_external_url(url: &str) -> Result<(), String> {
    imp::open_external_url(url).await
}
