//! Landing page for a shared link: one file's metadata, its QR code and a
//! download button. Read-only: no delete, no way into the file list.

use tracing::warn;

use crate::api::FileApi;
use crate::effects::{CopiedIndicator, Effect};
use crate::env::Environment;
use crate::error::ApiError;
use crate::qr;
use crate::record::FileRecord;
use crate::share_link::build_full_share;

pub const NOT_FOUND_MESSAGE: &str = "File not found or expired";
pub const NOT_FOUND_HINT: &str = "The file may have expired or does not exist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    Loading,
    Error(String),
    Loaded(FileRecord),
}

#[derive(Debug)]
pub struct DownloadView {
    file_id: String,
    state: DownloadState,
    copied: Option<CopiedIndicator>,
}

impl DownloadView {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            state: DownloadState::Loading,
            copied: None,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    pub fn file(&self) -> Option<&FileRecord> {
        match &self.state {
            DownloadState::Loaded(record) => Some(record),
            _ => None,
        }
    }

    /// Settle the view with the info-endpoint result. Every failure, whether
    /// a 404, a 500 or a dropped connection, shows the same message.
    pub fn apply(&mut self, result: Result<FileRecord, ApiError>) {
        self.state = match result {
            Ok(record) => DownloadState::Loaded(record),
            Err(err) => {
                warn!(
                    file_id = %self.file_id,
                    status = ?err.status(),
                    error = %err,
                    "file info unavailable"
                );
                DownloadState::Error(NOT_FOUND_MESSAGE.to_string())
            }
        };
    }

    pub fn share_link(&self, env: &dyn Environment, prefix: &str) -> String {
        build_full_share(env, prefix, &self.file_id)
    }

    pub fn download(&self, api: &dyn FileApi) -> Option<Effect> {
        let record = self.file()?;
        Some(Effect::SaveFile {
            url: api.download_url(&record.id),
            file_name: record.file_name.clone(),
        })
    }

    pub fn copy_link(&self, env: &dyn Environment, prefix: &str) -> Option<Effect> {
        self.file()?;
        Some(Effect::WriteClipboard {
            text: self.share_link(env, prefix),
            file_id: self.file_id.clone(),
        })
    }

    pub fn mark_copied(&mut self, now_millis: u64) {
        self.copied = Some(CopiedIndicator::start(&self.file_id, now_millis));
    }

    pub fn is_copied(&self, now_millis: u64) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|c| c.shows(&self.file_id, now_millis))
    }

    pub fn back(&self) -> Effect {
        Effect::HistoryBack
    }

    pub fn qr_size(&self, env: &dyn Environment) -> u32 {
        qr::qr_size(env.viewport_width())
    }
}
