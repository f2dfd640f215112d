//! Shared test utilities.
//!
//! All tests that manipulate environment variables must use the shared
//! `env_lock()` to prevent race conditions.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use crate::api::{FileApi, PendingUpload, download_url};
use crate::error::ApiError;
use crate::record::FileRecord;

pub const FAKE_API_BASE: &str = "http://backend.test/api";

/// Global lock for tests that modify environment variables.
/// All such tests MUST hold this lock to prevent race conditions.
pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for temporarily setting an environment variable.
pub struct EnvGuard {
    key: String,
    old: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let old = std::env::var(key).ok();
        unsafe {
            std::env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            old,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(val) = &self.old {
            unsafe {
                std::env::set_var(&self.key, val);
            }
        } else {
            unsafe {
                std::env::remove_var(&self.key);
            }
        }
    }
}

pub fn make_record(id: &str) -> FileRecord {
    FileRecord {
        id: id.to_string(),
        file_name: format!("{id}.txt"),
        file_size: 1536,
        upload_time: "2024-05-01T10:00:00".to_string(),
        expiry_time: "2024-05-08T10:00:00".to_string(),
        download_count: 2,
        share_url: id.to_string(),
        description: String::new(),
    }
}

pub fn pending(name: &str) -> PendingUpload {
    PendingUpload {
        file_name: name.to_string(),
        data: name.as_bytes().to_vec(),
    }
}

fn status(code: u16) -> ApiError {
    ApiError::Status {
        status: code,
        body: String::new(),
    }
}

/// In-memory backend with switchable failures.
#[derive(Default)]
pub struct FakeApi {
    files: RefCell<Vec<FileRecord>>,
    fail_list: Cell<bool>,
    fail_delete: Cell<bool>,
    fail_info_transport: Cell<bool>,
    failing_uploads: RefCell<HashSet<String>>,
    upload_calls: RefCell<Vec<(String, u32, String)>>,
    info_calls: Cell<usize>,
    next_id: Cell<u32>,
}

impl FakeApi {
    pub fn with_files(files: Vec<FileRecord>) -> Self {
        let api = Self::default();
        *api.files.borrow_mut() = files;
        api
    }

    pub fn fail_list(&self) {
        self.fail_list.set(true);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.set(true);
    }

    pub fn fail_info_transport(&self) {
        self.fail_info_transport.set(true);
    }

    pub fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads
            .borrow_mut()
            .insert(file_name.to_string());
    }

    pub fn upload_calls(&self) -> Vec<(String, u32, String)> {
        self.upload_calls.borrow().clone()
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.get()
    }
}

impl FileApi for FakeApi {
    fn list_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        if self.fail_list.get() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(self.files.borrow().clone())
    }

    fn upload_file(
        &self,
        upload: &PendingUpload,
        expiry_days: u32,
        description: &str,
    ) -> Result<FileRecord, ApiError> {
        self.upload_calls.borrow_mut().push((
            upload.file_name.clone(),
            expiry_days,
            description.to_string(),
        ));
        if self.failing_uploads.borrow().contains(&upload.file_name) {
            return Err(status(500));
        }
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let id = format!("up-{n}");
        let record = FileRecord {
            file_name: upload.file_name.clone(),
            file_size: upload.data.len() as u64,
            ..make_record(&id)
        };
        self.files.borrow_mut().insert(0, record.clone());
        Ok(record)
    }

    fn file_info(&self, id: &str) -> Result<FileRecord, ApiError> {
        self.info_calls.set(self.info_calls.get() + 1);
        if self.fail_info_transport.get() {
            return Err(ApiError::Transport("timed out".to_string()));
        }
        self.files
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| status(404))
    }

    fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        if self.fail_delete.get() {
            return Err(status(500));
        }
        let mut files = self.files.borrow_mut();
        let before = files.len();
        files.retain(|r| r.id != id);
        if files.len() == before {
            return Err(status(404));
        }
        Ok(())
    }

    fn cleanup_expired(&self) -> Result<(), ApiError> {
        Ok(())
    }

    fn download_url(&self, id: &str) -> String {
        download_url(FAKE_API_BASE, id)
    }
}
