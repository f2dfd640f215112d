//! One-shot file commands: list, upload, delete, info, download, link, qr, cleanup.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use sharefile::api::build_agent;
use sharefile::clipboard::Clipboard;
use sharefile::qr::{qr_size, qr_svg, qr_terminal};
use sharefile::record::{format_file_size, format_time};
use sharefile::{
    AppShell, Config, DownloadState, DownloadView, Effect, EffectRunner, Environment, FileApi,
    FileRecord, HttpApi, Outcome, PageEnv, build_full_share, build_share_link,
};

pub fn connect(config: &Config) -> HttpApi {
    HttpApi::new(&config.api_base_url, build_agent(config.request_timeout_secs))
}

pub fn runner(api: &HttpApi, download_dir: PathBuf) -> EffectRunner {
    EffectRunner::new(api.agent().clone(), download_dir, Clipboard::detect())
}

/// Report an effect's outcome. Returns false for alerts.
pub fn report(outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Saved(path) => println!("Saved to {}", path.display()),
        Outcome::Copied { .. } => println!("Copied"),
        Outcome::Alert(message) => {
            eprintln!("alert: {message}");
            return false;
        }
        Outcome::WentBack | Outcome::Ignored => {}
    }
    true
}

pub fn print_details(file: &FileRecord) {
    println!("ID:         {}", file.id);
    println!("Name:       {}", file.file_name);
    println!("Size:       {}", format_file_size(file.file_size));
    println!("Uploaded:   {}", format_time(&file.upload_time));
    println!("Expires:    {}", format_time(&file.expiry_time));
    println!("Downloads:  {}", file.download_count);
    if !file.description.is_empty() {
        println!("Notes:      {}", file.description);
    }
}

/// List all files in plain text
pub fn list(config: &Config) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(&config.page_url);
    let mut app = AppShell::new();
    app.load_files(&api);

    if app.files().is_empty() {
        println!("No files found.");
        return Ok(());
    }

    for file in app.files() {
        println!(
            "{} {} ({}) uploaded {} - {}",
            file.id,
            file.file_name,
            format_file_size(file.file_size),
            format_time(&file.upload_time),
            build_share_link(&env, &config.share_hash_prefix, &file.share_url)
        );
    }
    Ok(())
}

pub fn upload(config: &Config, paths: &[PathBuf], expiry_days: u32) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(&config.page_url);
    let mut app = AppShell::new();

    let result = app.upload_paths(&api, paths, expiry_days);
    for effect in &result.effects {
        if let Effect::Alert(message) = effect {
            eprintln!("alert: {message}");
        }
    }
    for id in &result.uploaded {
        if let Some(link) = app.share_link(&env, &config.share_hash_prefix, id) {
            println!("{link}");
        }
    }
    if result.uploaded.is_empty() {
        bail!("no files were uploaded");
    }
    eprintln!(
        "Uploaded {} of {} files (expire in {expiry_days} days)",
        result.uploaded.len(),
        paths.len()
    );
    Ok(())
}

pub fn delete(config: &Config, id: &str, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        use dialoguer::{Confirm, theme::ColorfulTheme};
        let confirm = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {id} from the server?"))
            .default(false)
            .interact()?;
        if !confirm {
            println!("Delete cancelled.");
            return Ok(());
        }
    }
    let api = connect(config);
    let mut app = AppShell::new();
    if let Some(Effect::Alert(message)) = app.delete(&api, id) {
        bail!("{message}");
    }
    println!("Deleted {id}.");
    Ok(())
}

/// Loaded download view for `id`, the way a share link would open it.
fn open_download_view(api: &HttpApi, id: &str) -> Result<DownloadView> {
    let mut view = DownloadView::new(id);
    view.apply(api.file_info(id));
    if let DownloadState::Error(message) = view.state() {
        bail!("{message}");
    }
    Ok(view)
}

pub fn info(config: &Config, id: &str) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(&config.page_url);
    let view = open_download_view(&api, id)?;
    if let Some(file) = view.file() {
        print_details(file);
        println!("Link:       {}", view.share_link(&env, &config.share_hash_prefix));
    }
    Ok(())
}

pub fn download(config: &Config, id: &str, out: Option<PathBuf>) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(&config.page_url);
    let view = open_download_view(&api, id)?;
    let out = match out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut runner = runner(&api, out);
    if let Some(effect) = view.download(&api) {
        if !report(&runner.run(effect, &env)) {
            bail!("download failed");
        }
    }
    Ok(())
}

pub fn link(config: &Config, reference: &str, copy: bool) -> Result<()> {
    let env = PageEnv::new(&config.page_url);
    let link = build_share_link(&env, &config.share_hash_prefix, reference);
    println!("{link}");
    if copy && !link.is_empty() {
        let api = connect(config);
        let mut runner = runner(&api, std::env::temp_dir());
        let outcome = runner.run(
            Effect::WriteClipboard {
                text: link,
                file_id: reference.to_string(),
            },
            &env,
        );
        if !report(&outcome) {
            bail!("copy failed");
        }
    }
    Ok(())
}

pub fn qr(config: &Config, id: &str, svg: Option<PathBuf>) -> Result<()> {
    let env = PageEnv::new(&config.page_url);
    let link = build_full_share(&env, &config.share_hash_prefix, id);
    match svg {
        Some(path) => write_qr_svg(&path, &link, qr_size(env.viewport_width()))?,
        None => {
            println!("{}", qr_terminal(&link).context("unable to generate QR")?);
            println!("{link}");
        }
    }
    Ok(())
}

pub fn write_qr_svg(path: &Path, link: &str, size: u32) -> Result<()> {
    let svg = qr_svg(link, size).context("unable to generate QR")?;
    fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved QR code to {}", path.display());
    Ok(())
}

pub fn cleanup(config: &Config) -> Result<()> {
    let api = connect(config);
    api.cleanup_expired().context("cleanup request failed")?;
    println!("Expired files purged.");
    Ok(())
}
