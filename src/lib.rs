//! Client for a file-sharing backend: upload files, list them, and hand out
//! cache-busted share links and QR codes that open a read-only download page.

pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod download_view;
pub mod effects;
pub mod env;
pub mod error;
pub mod qr;
pub mod record;
pub mod render;
pub mod router;
pub mod share_link;
pub mod shell;

#[cfg(test)]
mod test_utils;

pub use api::{FileApi, HttpApi, PendingUpload};
pub use app::{AppShell, UploadReport};
pub use config::Config;
pub use download_view::{DownloadState, DownloadView};
pub use effects::{Effect, EffectRunner, Outcome};
pub use env::{Environment, PageEnv};
pub use error::ApiError;
pub use record::FileRecord;
pub use router::Route;
pub use share_link::{build_full_share, build_share_link};
pub use shell::{Shell, View};
