//! Backend REST client.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::record::FileRecord;

pub const TIMESTAMP_PARAM: &str = "_t";

/// A local file waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl PendingUpload {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, data })
    }
}

/// The operations the client needs from the file backend.
pub trait FileApi {
    fn list_files(&self) -> Result<Vec<FileRecord>, ApiError>;

    fn upload_file(
        &self,
        upload: &PendingUpload,
        expiry_days: u32,
        description: &str,
    ) -> Result<FileRecord, ApiError>;

    fn file_info(&self, id: &str) -> Result<FileRecord, ApiError>;

    fn delete_file(&self, id: &str) -> Result<(), ApiError>;

    /// Ask the backend to purge expired files now.
    fn cleanup_expired(&self) -> Result<(), ApiError>;

    /// Where the binary payload for `id` is served.
    fn download_url(&self, id: &str) -> String;
}

/// Append a cache-busting `_t=<millis>` query parameter.
pub fn with_timestamp(url: &str, now_millis: u64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{TIMESTAMP_PARAM}={now_millis}")
}

pub fn download_url(base_url: &str, id: &str) -> String {
    format!("{}/files/{}/download", base_url.trim_end_matches('/'), id)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

pub fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder.build()
}

/// Blocking HTTP implementation of [`FileApi`].
pub struct HttpApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpApi {
    pub fn new(base_url: &str, agent: ureq::Agent) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl FileApi for HttpApi {
    fn list_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        let url = with_timestamp(&self.endpoint("/files/list"), now_millis());
        debug!(%url, "listing files");
        let response = self.agent.get(&url).call()?;
        response
            .into_json()
            .map_err(|e| ApiError::Decode(format!("file list: {e}")))
    }

    fn upload_file(
        &self,
        upload: &PendingUpload,
        expiry_days: u32,
        description: &str,
    ) -> Result<FileRecord, ApiError> {
        let boundary = multipart_boundary();
        let body = multipart_body(&boundary, upload, expiry_days, description);
        info!(file = %upload.file_name, bytes = upload.data.len(), "uploading");
        let response = self
            .agent
            .post(&self.endpoint("/files/upload"))
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .send_bytes(&body)?;
        response
            .into_json()
            .map_err(|e| ApiError::Decode(format!("upload response: {e}")))
    }

    fn file_info(&self, id: &str) -> Result<FileRecord, ApiError> {
        let url = with_timestamp(&self.endpoint(&format!("/files/{id}/info")), now_millis());
        debug!(%url, "fetching file info");
        let response = self.agent.get(&url).call()?;
        response
            .into_json()
            .map_err(|e| ApiError::Decode(format!("file info: {e}")))
    }

    fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        info!(%id, "deleting");
        self.agent
            .delete(&self.endpoint(&format!("/files/{id}")))
            .call()?;
        Ok(())
    }

    fn cleanup_expired(&self) -> Result<(), ApiError> {
        self.agent.post(&self.endpoint("/files/cleanup")).call()?;
        Ok(())
    }

    fn download_url(&self, id: &str) -> String {
        download_url(&self.base_url, id)
    }
}

fn multipart_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("----sharefile{token}")
}

/// Quote a filename for a Content-Disposition header the way browsers do.
fn quote_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Form body with the fields the upload endpoint expects:
/// `file`, `expiryDays`, `description`.
fn multipart_body(
    boundary: &str,
    upload: &PendingUpload,
    expiry_days: u32,
    description: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(upload.data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            quote_filename(&upload.file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(&upload.data);
    body.extend_from_slice(b"\r\n");
    for (name, value) in [
        ("expiryDays", expiry_days.to_string()),
        ("description", description.to_string()),
    ] {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
