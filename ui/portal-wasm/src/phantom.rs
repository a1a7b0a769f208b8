//! Bridge to the wallet object Phantom injects as `window.solana`.

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Promise, Reflect};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tv_api_types::Address;
use tv_chain_client::{
    ChainError, ChainResult, ConnectMode, GatewayPresence, Timer, WalletGateway, WalletSigner,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectOptions {
    only_if_trusted: bool,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    method: &'a str,
    params: SignParams,
}

#[derive(Serialize)]
struct SignParams {
    message: String,
}

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

fn provider() -> Option<JsValue> {
    let window = gloo_utils::window();
    let value = Reflect::get(&window, &JsValue::from_str("solana")).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn describe(err: &JsValue) -> String {
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn wallet_err(err: JsValue) -> ChainError {
    ChainError::Wallet(describe(&err))
}

/// Calls `provider[method](arg)` and awaits the promise it returns.
async fn invoke(provider: &JsValue, method: &str, arg: &JsValue) -> ChainResult<JsValue> {
    let func: Function = Reflect::get(provider, &JsValue::from_str(method))
        .map_err(wallet_err)?
        .dyn_into()
        .map_err(|_| ChainError::Wallet(format!("wallet has no {method} method")))?;
    let promise: Promise = func
        .call1(provider, arg)
        .map_err(wallet_err)?
        .dyn_into()
        .map_err(|_| ChainError::Wallet(format!("{method} did not return a promise")))?;
    JsFuture::from(promise).await.map_err(wallet_err)
}

fn to_js<T: Serialize>(value: &T) -> ChainResult<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| ChainError::Wallet(e.to_string()))
}

fn required_provider() -> ChainResult<JsValue> {
    provider().ok_or_else(|| ChainError::Wallet("no wallet injected".into()))
}

/// Stateless handle; every call reads `window.solana` afresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhantomGateway;

#[async_trait(?Send)]
impl WalletGateway for PhantomGateway {
    fn presence(&self) -> GatewayPresence {
        let Some(provider) = provider() else {
            return GatewayPresence::Missing;
        };
        let is_phantom = Reflect::get(&provider, &JsValue::from_str("isPhantom"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if is_phantom {
            GatewayPresence::Ready
        } else {
            GatewayPresence::Unsupported
        }
    }

    async fn connect(&self, mode: ConnectMode) -> ChainResult<Address> {
        let provider = required_provider()?;
        let options = to_js(&ConnectOptions {
            only_if_trusted: mode == ConnectMode::TrustedOnly,
        })?;
        let response = invoke(&provider, "connect", &options).await?;

        let key = Reflect::get(&response, &JsValue::from_str("publicKey")).map_err(wallet_err)?;
        let key: &Object = key
            .dyn_ref()
            .ok_or_else(|| ChainError::Wallet("connect returned no public key".into()))?;
        let text = String::from(key.to_string());
        debug!(key = %text, ?mode, "wallet returned public key");
        text.parse::<Address>()
            .map_err(|e| ChainError::Wallet(format!("wallet public key: {e}")))
    }
}

#[async_trait(?Send)]
impl WalletSigner for PhantomGateway {
    async fn sign_message(&self, signer: &Address, message: &[u8]) -> ChainResult<[u8; 64]> {
        let provider = required_provider()?;
        let request = to_js(&SignRequest {
            method: "signTransaction",
            params: SignParams {
                message: bs58::encode(message).into_string(),
            },
        })?;
        debug!(%signer, len = message.len(), "requesting wallet signature");
        let response = invoke(&provider, "request", &request).await?;
        let SignResponse { signature } = serde_wasm_bindgen::from_value(response)
            .map_err(|e| ChainError::Wallet(format!("sign response: {e}")))?;

        let bytes = bs58::decode(&signature)
            .into_vec()
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        <[u8; 64]>::try_from(bytes.as_slice())
            .map_err(|_| ChainError::Signing(format!("signature is {} bytes", bytes.len())))
    }
}

/// Sleeps on the browser's `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep_ms(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}
