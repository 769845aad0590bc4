use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ImageStore, ImageStoreError, UploadOptions, UploadedImage};

/// In-memory image store recording every call; failures are switched on per operation.
#[derive(Default)]
pub struct MockImageStore {
    pub upload_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    pub fail_upload: AtomicBool,
    pub fail_destroy: AtomicBool,
    uploads: Mutex<Vec<(PathBuf, UploadOptions)>>,
    destroyed: Mutex<Vec<String>>,
}

impl MockImageStore {
    pub fn uploads(&self) -> usize { self.upload_calls.load(Ordering::SeqCst) }

    pub fn destroys(&self) -> usize { self.destroy_calls.load(Ordering::SeqCst) }

    pub fn last_upload(&self) -> Option<(PathBuf, UploadOptions)> {
        self.uploads.lock().unwrap().last().cloned()
    }

    pub fn destroyed_ids(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, path: &Path, opts: &UploadOptions) -> Result<UploadedImage, ImageStoreError> {
        let n = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.uploads.lock().unwrap().push((path.to_path_buf(), opts.clone()));
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(ImageStoreError::Rejected { status: 500, message: "upload rejected".into() });
        }
        // the real client reads the file, so a missing file fails here too
        tokio::fs::metadata(path).await.map_err(|e| ImageStoreError::Io(e.to_string()))?;
        let public_id = format!("{}/mock-{}", opts.folder, n);
        Ok(UploadedImage {
            url: format!("https://images.example.com/{}/{}.png", opts.resource_type.as_str(), public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(ImageStoreError::Http("connection reset".into()));
        }
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
