//! Player photo storage through an external image store
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Prepared image bytes ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Inline `data:` URL for this image.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Where a stored photo ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum PhotoRef {
    /// Hosted by the image store
    Remote(String),
    /// Encoded inline because the store was unavailable
    Inline(String),
}

impl PhotoRef {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            PhotoRef::Remote(url) | PhotoRef::Inline(url) => url,
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, PhotoRef::Remote(_))
    }
}

/// Remote image hosting. Uploads resolve to a public URL or fail outright;
/// there is no progress reporting.
#[allow(async_fn_in_trait)]
pub trait ImageStore {
    type Error: std::error::Error + 'static;

    fn is_configured(&self) -> bool;

    /// Upload `blob` for `target_id` on behalf of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the store is unreachable.
    async fn upload_image(
        &self,
        owner_id: &str,
        target_id: &str,
        blob: &ImageBlob,
    ) -> Result<String, Self::Error>;

    /// Remove a previously uploaded image.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses the deletion.
    async fn delete_image(&self, owner_id: &str, target_id: &str) -> Result<(), Self::Error>;
}

/// Upload a photo, falling back to an inline data URL when the store is not
/// configured or the upload fails. Never retries.
pub async fn store_photo<I: ImageStore>(
    images: &I,
    owner_id: &str,
    target_id: &str,
    blob: &ImageBlob,
) -> PhotoRef {
    if !images.is_configured() {
        log::debug!("image store not configured; inlining photo for {target_id}");
        return PhotoRef::Inline(blob.to_data_url());
    }
    match images.upload_image(owner_id, target_id, blob).await {
        Ok(url) => PhotoRef::Remote(url),
        Err(err) => {
            log::warn!("photo upload for {target_id} failed, using inline copy: {err}");
            PhotoRef::Inline(blob.to_data_url())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("bucket offline")]
    struct Offline;

    struct FakeStore {
        configured: bool,
        fail: bool,
        uploads: RefCell<Vec<String>>,
    }

    impl ImageStore for FakeStore {
        type Error = Offline;

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn upload_image(
            &self,
            owner_id: &str,
            target_id: &str,
            _blob: &ImageBlob,
        ) -> Result<String, Self::Error> {
            if self.fail {
                return Err(Offline);
            }
            let path = format!("{owner_id}/{target_id}");
            self.uploads.borrow_mut().push(path.clone());
            Ok(format!("https://img.example/{path}"))
        }

        async fn delete_image(&self, _owner_id: &str, _target_id: &str) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn store(configured: bool, fail: bool) -> FakeStore {
        FakeStore {
            configured,
            fail,
            uploads: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn data_url_encodes_bytes() {
        let blob = ImageBlob::new("image/png", vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(blob.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn successful_upload_is_remote() {
        let images = store(true, false);
        let blob = ImageBlob::new("image/jpeg", vec![1, 2, 3]);
        let photo = block_on(store_photo(&images, "coach-1", "db_4", &blob));
        assert_eq!(photo, PhotoRef::Remote("https://img.example/coach-1/db_4".into()));
        assert!(photo.is_remote());
        assert_eq!(images.uploads.borrow().len(), 1);
    }

    #[test]
    fn failed_upload_falls_back_inline_once() {
        let images = store(true, true);
        let blob = ImageBlob::new("image/jpeg", vec![1, 2, 3]);
        let photo = block_on(store_photo(&images, "coach-1", "db_4", &blob));
        assert_eq!(photo, PhotoRef::Inline("data:image/jpeg;base64,AQID".into()));
    }

    #[test]
    fn unconfigured_store_is_skipped() {
        let images = store(false, false);
        let blob = ImageBlob::new("image/jpeg", vec![1, 2, 3]);
        let photo = block_on(store_photo(&images, "coach-1", "db_4", &blob));
        assert!(!photo.is_remote());
        assert!(images.uploads.borrow().is_empty());
    }
}
