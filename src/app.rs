//! File manager view: the uploaded-file list, its detail view and the actions
//! on them.
//!
//! All state lives in [`AppShell`] and changes only through its operations.
//! Operations that need the outside world return [`Effect`]s instead of
//! performing them.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::api::{FileApi, PendingUpload};
use crate::effects::{CopiedIndicator, Effect};
use crate::env::Environment;
use crate::qr;
use crate::record::{FileList, FileRecord};
use crate::share_link::{build_share_link, copy_text_for};

pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete file";

/// Result of a multi-file upload.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Ids of records added, in upload order.
    pub uploaded: Vec<String>,
    /// Names of files that failed.
    pub failed: Vec<String>,
    /// One alert per failed file.
    pub effects: Vec<Effect>,
}

impl UploadReport {
    fn fail(&mut self, name: String) {
        self.effects
            .push(Effect::Alert(format!("Upload failed: {name}")));
        self.failed.push(name);
    }
}

#[derive(Debug, Default)]
pub struct AppShell {
    files: FileList,
    selected: Option<String>,
    copied: Option<CopiedIndicator>,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[FileRecord] {
        self.files.as_slice()
    }

    pub fn file(&self, id: &str) -> Option<&FileRecord> {
        self.files.get(id)
    }

    /// Record shown in the detail view, if any.
    pub fn selected(&self) -> Option<&FileRecord> {
        self.selected.as_deref().and_then(|id| self.files.get(id))
    }

    /// Replace the list with the backend's. On failure the list is left as is
    /// and the error is only logged.
    pub fn load_files(&mut self, api: &dyn FileApi) {
        match api.list_files() {
            Ok(records) => {
                info!(count = records.len(), "loaded file list");
                self.files.replace(records);
            }
            Err(err) => error!(error = %err, "failed to load file list"),
        }
    }

    /// Upload each file in turn. Successes are prepended as they complete;
    /// each failure adds an alert naming the file and the rest still go up.
    pub fn upload(
        &mut self,
        api: &dyn FileApi,
        uploads: &[PendingUpload],
        expiry_days: u32,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        for upload in uploads {
            self.upload_one(api, upload, expiry_days, &mut report);
        }
        report
    }

    /// Like [`AppShell::upload`], reading each file just before sending it.
    /// A file that can't be read fails on its own.
    pub fn upload_paths(
        &mut self,
        api: &dyn FileApi,
        paths: &[PathBuf],
        expiry_days: u32,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        for path in paths {
            match PendingUpload::from_path(path) {
                Ok(upload) => self.upload_one(api, &upload, expiry_days, &mut report),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read upload");
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    report.fail(name);
                }
            }
        }
        report
    }

    fn upload_one(
        &mut self,
        api: &dyn FileApi,
        upload: &PendingUpload,
        expiry_days: u32,
        report: &mut UploadReport,
    ) {
        match api.upload_file(upload, expiry_days, "") {
            Ok(record) => {
                report.uploaded.push(record.id.clone());
                self.files.prepend(record);
            }
            Err(err) => {
                warn!(file = %upload.file_name, error = %err, "upload failed");
                report.fail(upload.file_name.clone());
            }
        }
    }

    /// Open the detail view for `id`. Returns false for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if self.files.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Delete on the backend, then locally. Deleting the selected file
    /// returns to the list view.
    pub fn delete(&mut self, api: &dyn FileApi, id: &str) -> Option<Effect> {
        match api.delete_file(id) {
            Ok(()) => {
                self.files.remove(id);
                if self.selected.as_deref() == Some(id) {
                    self.selected = None;
                }
                None
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed");
                Some(Effect::Alert(DELETE_FAILED_MESSAGE.to_string()))
            }
        }
    }

    /// Share link as displayed in the detail view.
    pub fn share_link(&self, env: &dyn Environment, prefix: &str, id: &str) -> Option<String> {
        let record = self.files.get(id)?;
        Some(build_share_link(env, prefix, &record.share_url))
    }

    pub fn copy_link(&self, env: &dyn Environment, prefix: &str, id: &str) -> Option<Effect> {
        let record = self.files.get(id)?;
        Some(Effect::WriteClipboard {
            text: copy_text_for(env, prefix, &record.share_url),
            file_id: record.id.clone(),
        })
    }

    /// Called once the clipboard write went through.
    pub fn mark_copied(&mut self, file_id: &str, now_millis: u64) {
        self.copied = Some(CopiedIndicator::start(file_id, now_millis));
    }

    pub fn is_copied(&self, file_id: &str, now_millis: u64) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|c| c.shows(file_id, now_millis))
    }

    pub fn download(&self, api: &dyn FileApi, id: &str) -> Option<Effect> {
        let record = self.files.get(id)?;
        Some(Effect::SaveFile {
            url: api.download_url(&record.id),
            file_name: record.file_name.clone(),
        })
    }

    /// QR image of the record's share link, as `(file name, svg)`.
    pub fn qr_image(
        &self,
        env: &dyn Environment,
        prefix: &str,
        id: &str,
    ) -> Option<(String, String)> {
        let record = self.files.get(id)?;
        let link = build_share_link(env, prefix, &record.share_url);
        match qr::qr_svg(&link, qr::DETAIL_QR_SIZE) {
            Ok(svg) => Some((qr::qr_file_name(&record.file_name), svg)),
            Err(err) => {
                warn!(%id, error = %err, "unable to generate QR");
                None
            }
        }
    }
}
