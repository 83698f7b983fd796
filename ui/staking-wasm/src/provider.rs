//! EIP-1193 transport over the injected `window.ethereum` provider.

use asva_chain_client::ChainError;
use asva_chain_eip1193::{Eip1193Transport, RpcErrorObject, rpc_error};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Looks the provider up on every request: extensions may inject it after
/// the page has loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserProvider;

fn ethereum() -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

pub fn is_available() -> bool {
    ethereum().is_some()
}

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

fn field(value: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Wallets reject with `{ code, message, data }`.
fn js_error(err: JsValue) -> ChainError {
    let message = field(&err, "message")
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    let data = field(&err, "data").and_then(|v| serde_wasm_bindgen::from_value::<Value>(v).ok());

    match field(&err, "code").and_then(|v| v.as_f64()) {
        Some(code) => rpc_error(RpcErrorObject {
            code: code as i64,
            message,
            data,
        }),
        None => ChainError::Transport(message),
    }
}

#[async_trait(?Send)]
impl Eip1193Transport for BrowserProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let ethereum = ethereum().ok_or(ChainError::ProviderUnavailable)?;
        let request: Function = field(&ethereum, "request")
            .and_then(|f| f.dyn_into().ok())
            .ok_or(ChainError::ProviderUnavailable)?;

        let args = RequestArguments {
            method,
            params: &params,
        }
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ChainError::Transport(format!("{method}: {e}")))?;

        let promise: Promise = request
            .call1(&ethereum, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ChainError::Transport(format!("{method}: provider did not return a promise")))?;

        let result = JsFuture::from(promise).await.map_err(js_error)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| ChainError::Decode(format!("{method}: {e}")))
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
