//! JS-supplied collaborators: capability check and image hosting
use js_sys::{Function, Promise, Reflect, Uint8Array};
use pitchrank_core::{CapabilityCheck, ImageBlob, ImageStore};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom;

/// Wraps a JS `canPerform(name) -> boolean` callback.
/// Anything other than `true` (including a throw) denies.
pub struct JsCapabilities(Function);

impl JsCapabilities {
    #[must_use]
    pub const fn new(can_perform: Function) -> Self {
        Self(can_perform)
    }
}

impl CapabilityCheck for JsCapabilities {
    fn can_perform(&self, capability: &str) -> bool {
        self.0
            .call1(&JsValue::NULL, &JsValue::from_str(capability))
            .map(|allowed| allowed.as_bool().unwrap_or(false))
            .unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("image store: {0}")]
pub struct JsImageError(String);

impl From<JsValue> for JsImageError {
    fn from(value: JsValue) -> Self {
        Self(dom::js_error_message(&value))
    }
}

/// Image store backed by a JS object exposing
/// `isConfigured()`, `uploadImage(ownerId, targetId, bytes, mime)` and
/// `deleteImage(ownerId, targetId)`; the async ones return promises.
pub struct JsImageStore {
    target: JsValue,
}

impl JsImageStore {
    #[must_use]
    pub const fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn method(&self, name: &str) -> Result<Function, JsImageError> {
        Reflect::get(&self.target, &JsValue::from_str(name))?
            .dyn_into::<Function>()
            .map_err(|_| JsImageError(format!("`{name}` is not a function")))
    }

    async fn settle(value: JsValue) -> Result<JsValue, JsImageError> {
        match value.dyn_into::<Promise>() {
            Ok(promise) => Ok(JsFuture::from(promise).await?),
            Err(plain) => Ok(plain),
        }
    }
}

impl ImageStore for JsImageStore {
    type Error = JsImageError;

    fn is_configured(&self) -> bool {
        self.method("isConfigured")
            .and_then(|f| Ok(f.call0(&self.target)?))
            .map(|v| v.as_bool().unwrap_or(false))
            .unwrap_or(false)
    }

    async fn upload_image(
        &self,
        owner_id: &str,
        target_id: &str,
        blob: &ImageBlob,
    ) -> Result<String, Self::Error> {
        let upload = self.method("uploadImage")?;
        let args = js_sys::Array::of4(
            &JsValue::from_str(owner_id),
            &JsValue::from_str(target_id),
            &Uint8Array::from(blob.bytes.as_slice()),
            &JsValue::from_str(&blob.mime),
        );
        let returned = upload.apply(&self.target, &args)?;
        let url = Self::settle(returned).await?;
        url.as_string()
            .ok_or_else(|| JsImageError("uploadImage did not resolve to a URL".to_string()))
    }

    async fn delete_image(&self, owner_id: &str, target_id: &str) -> Result<(), Self::Error> {
        let delete = self.method("deleteImage")?;
        let returned = delete.call2(
            &self.target,
            &JsValue::from_str(owner_id),
            &JsValue::from_str(target_id),
        )?;
        Self::settle(returned).await?;
        Ok(())
    }
}
