//! Side effects requested by the views, and the native runner that performs them.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::env::PageEnv;
use crate::error::ApiError;

pub const COPY_FAILED_MESSAGE: &str = "Copy failed, please retry";

/// Something a view wants done outside of its own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch `url` and store it as `file_name`.
    SaveFile { url: String, file_name: String },
    /// Put `text` on the clipboard; `file_id` gets the "copied" indicator.
    WriteClipboard { text: String, file_id: String },
    /// Blocking notice for the user.
    Alert(String),
    /// Browser-style history navigation.
    HistoryBack,
}

/// What came of running an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(PathBuf),
    Copied { file_id: String },
    Alert(String),
    WentBack,
    /// Nothing happened (e.g. no history to go back to).
    Ignored,
}

/// Where "copied" feedback is showing, and until when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedIndicator {
    pub file_id: String,
    pub until_millis: u64,
}

impl CopiedIndicator {
    pub const DURATION_MILLIS: u64 = 2_000;

    pub fn start(file_id: &str, now_millis: u64) -> Self {
        Self {
            file_id: file_id.to_string(),
            until_millis: now_millis + Self::DURATION_MILLIS,
        }
    }

    pub fn shows(&self, file_id: &str, now_millis: u64) -> bool {
        self.file_id == file_id && now_millis < self.until_millis
    }
}

pub struct EffectRunner {
    agent: ureq::Agent,
    download_dir: PathBuf,
    clipboard: Clipboard,
}

impl EffectRunner {
    pub fn new(agent: ureq::Agent, download_dir: PathBuf, clipboard: Clipboard) -> Self {
        Self {
            agent,
            download_dir,
            clipboard,
        }
    }

    pub fn run(&mut self, effect: Effect, env: &PageEnv) -> Outcome {
        match effect {
            Effect::SaveFile { url, file_name } => match self.save_file(&url, &file_name) {
                Ok(path) => Outcome::Saved(path),
                Err(err) => {
                    warn!(%url, error = %err, "download failed");
                    Outcome::Alert(format!("Download failed: {file_name}"))
                }
            },
            Effect::WriteClipboard { text, file_id } => match self.clipboard.copy(&text) {
                Ok(()) => Outcome::Copied { file_id },
                Err(err) => {
                    warn!(error = %err, "copy failed");
                    Outcome::Alert(COPY_FAILED_MESSAGE.to_string())
                }
            },
            Effect::Alert(message) => Outcome::Alert(message),
            Effect::HistoryBack => {
                if env.history_back() {
                    Outcome::WentBack
                } else {
                    Outcome::Ignored
                }
            }
        }
    }

    fn save_file(&self, url: &str, file_name: &str) -> Result<PathBuf, ApiError> {
        let response = self.agent.get(url).call()?;
        let name = if file_name.is_empty() {
            response
                .header("Content-Disposition")
                .and_then(disposition_filename)
                .unwrap_or_else(|| "download".to_string())
        } else {
            file_name.to_string()
        };
        std::fs::create_dir_all(&self.download_dir)?;
        let path = unique_path(&self.download_dir, &safe_file_name(&name));
        let mut file = File::create(&path)?;
        let bytes = std::io::copy(&mut response.into_reader(), &mut file)?;
        info!(path = %path.display(), bytes, "saved");
        Ok(path)
    }
}

/// `filename` parameter of a Content-Disposition header.
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Last path component only, so a record name can't escape the target dir.
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| n != "..")
        .unwrap_or_else(|| "download".to_string())
}

/// `dir/name`, or `dir/stem (n).ext` for the first n that doesn't exist yet.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardBackend;
    use crate::env::Environment;
    use std::fs;
    use tempfile::TempDir;

    struct Failing;

    impl ClipboardBackend for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn write_text(&mut self, _text: &str) -> anyhow::Result<()> {
            anyhow::bail!("no clipboard")
        }
    }

    fn runner(dir: &Path, clipboard: Clipboard) -> EffectRunner {
        EffectRunner::new(ureq::agent(), dir.to_path_buf(), clipboard)
    }

    #[test]
    fn copied_indicator_lasts_two_seconds_for_its_file() {
        let indicator = CopiedIndicator::start("a", 10_000);
        assert!(indicator.shows("a", 10_000));
        assert!(indicator.shows("a", 11_999));
        assert!(!indicator.shows("a", 12_000));
        assert!(!indicator.shows("b", 10_500));
    }

    #[test]
    fn disposition_filename_parses_quoted_and_bare() {
        assert_eq!(
            disposition_filename("attachment; filename=\"report.pdf\""),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            disposition_filename("attachment;filename=a.txt"),
            Some("a.txt".to_string())
        );
        assert_eq!(disposition_filename("inline"), None);
    }

    #[test]
    fn safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("plain.txt"), "plain.txt");
        assert_eq!(safe_file_name(".."), "download");
    }

    #[test]
    fn unique_path_numbers_collisions() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(unique_path(tmp.path(), "a.txt"), tmp.path().join("a.txt"));
        fs::write(tmp.path().join("a.txt"), "1").unwrap();
        fs::write(tmp.path().join("a (1).txt"), "2").unwrap();
        assert_eq!(unique_path(tmp.path(), "a.txt"), tmp.path().join("a (2).txt"));
        fs::write(tmp.path().join("README"), "3").unwrap();
        assert_eq!(unique_path(tmp.path(), "README"), tmp.path().join("README (1)"));
    }

    #[test]
    fn clipboard_failure_becomes_alert() {
        let tmp = TempDir::new().unwrap();
        let mut runner = runner(tmp.path(), Clipboard::new(None, Box::new(Failing)));
        let env = PageEnv::new("http://localhost/");
        let outcome = runner.run(
            Effect::WriteClipboard {
                text: "x".to_string(),
                file_id: "a".to_string(),
            },
            &env,
        );
        assert_eq!(outcome, Outcome::Alert(COPY_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn history_back_follows_page_history() {
        let tmp = TempDir::new().unwrap();
        let mut runner = runner(tmp.path(), Clipboard::new(None, Box::new(Failing)));
        let env = PageEnv::new("http://localhost/");
        assert_eq!(runner.run(Effect::HistoryBack, &env), Outcome::Ignored);
        env.set_hash("/file/abc");
        assert_eq!(runner.run(Effect::HistoryBack, &env), Outcome::WentBack);
        assert_eq!(env.href(), "http://localhost/");
    }

    #[test]
    fn alerts_pass_through() {
        let tmp = TempDir::new().unwrap();
        let mut runner = runner(tmp.path(), Clipboard::new(None, Box::new(Failing)));
        let env = PageEnv::new("http://localhost/");
        assert_eq!(
            runner.run(Effect::Alert("boom".to_string()), &env),
            Outcome::Alert("boom".to_string())
        );
    }
}
