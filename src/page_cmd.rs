//! Page commands: browse a page URL interactively, or write its view as HTML.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use sharefile::download_view::NOT_FOUND_HINT;
use sharefile::qr::qr_terminal;
use sharefile::record::format_file_size;
use sharefile::render::render_shell;
use sharefile::{
    AppShell, Config, DownloadState, DownloadView, Effect, EffectRunner, Environment, FileApi,
    Outcome, PageEnv, Shell, View,
};

use crate::files_cmd::{connect, print_details, report, runner};

struct Ctx<'a> {
    env: &'a PageEnv,
    api: &'a dyn FileApi,
    config: &'a Config,
    runner: EffectRunner,
    theme: ColorfulTheme,
}

impl Ctx<'_> {
    fn prefix(&self) -> &str {
        &self.config.share_hash_prefix
    }

    /// Run an effect and return the file id that was copied, if any.
    fn perform(&mut self, effect: Effect) -> Option<String> {
        let outcome = self.runner.run(effect, self.env);
        report(&outcome);
        match outcome {
            Outcome::Copied { file_id } => Some(file_id),
            _ => None,
        }
    }
}

pub fn open(config: &Config, url: Option<&str>) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(url.unwrap_or(&config.page_url));
    let mut ctx = Ctx {
        env: &env,
        api: &api,
        config,
        runner: runner(&api, std::env::current_dir()?),
        theme: ColorfulTheme::default(),
    };
    let mut shell = Shell::mount(&env, &api, config.clone());

    loop {
        shell.sync();
        let keep_going = match shell.view_mut() {
            View::Main(app) => {
                if app.selected().is_some() {
                    detail_menu(app, &mut ctx)?
                } else {
                    list_menu(app, &mut ctx)?
                }
            }
            View::Download(view) => download_menu(view, &mut ctx)?,
        };
        if !keep_going {
            break;
        }
    }
    Ok(())
}

pub fn render(config: &Config, url: Option<&str>, out: &Path) -> Result<()> {
    let api = connect(config);
    let env = PageEnv::new(url.unwrap_or(&config.page_url));
    let shell = Shell::mount(&env, &api, config.clone());
    let html = render_shell(&shell).into_string();
    fs::write(out, html).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn list_menu(app: &mut AppShell, ctx: &mut Ctx<'_>) -> Result<bool> {
    let now = ctx.env.now_millis();
    let mut items: Vec<String> = app
        .files()
        .iter()
        .map(|f| {
            let mark = if app.is_copied(&f.id, now) { " [copied]" } else { "" };
            format!("{} ({}){}", f.file_name, format_file_size(f.file_size), mark)
        })
        .collect();
    let count = items.len();
    items.push("Upload files".to_string());
    items.push("Refresh".to_string());
    items.push("Exit".to_string());

    let selection = Select::with_theme(&ctx.theme)
        .with_prompt(format!("My files ({count})"))
        .items(&items)
        .default(0)
        .interact()?;

    if selection < count {
        let id = app.files()[selection].id.clone();
        app.select(&id);
        return Ok(true);
    }
    match selection - count {
        0 => {
            let line: String = Input::with_theme(&ctx.theme)
                .with_prompt("Paths to upload (space separated)")
                .interact_text()?;
            let paths: Vec<PathBuf> = line.split_whitespace().map(PathBuf::from).collect();
            let result = app.upload_paths(ctx.api, &paths, ctx.config.default_expiry_days);
            for effect in result.effects {
                ctx.perform(effect);
            }
            println!("Uploaded {} of {} files.", result.uploaded.len(), paths.len());
            Ok(true)
        }
        1 => {
            app.load_files(ctx.api);
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn detail_menu(app: &mut AppShell, ctx: &mut Ctx<'_>) -> Result<bool> {
    let Some(file) = app.selected().cloned() else {
        return Ok(true);
    };
    let link = app
        .share_link(ctx.env, ctx.prefix(), &file.id)
        .unwrap_or_default();

    println!("\n--- File Details ---");
    print_details(&file);
    println!("Link:       {link}");
    if app.is_copied(&file.id, ctx.env.now_millis()) {
        println!("            (copied)");
    }
    println!();

    let actions = [
        "Copy link",
        "Download",
        "Show QR code",
        "Save QR image",
        "Open share page",
        "Delete",
        "Back",
    ];
    let action = Select::with_theme(&ctx.theme)
        .with_prompt("Action")
        .items(&actions)
        .default(0)
        .interact()?;

    match action {
        0 => {
            if let Some(effect) = app.copy_link(ctx.env, ctx.prefix(), &file.id) {
                if let Some(copied) = ctx.perform(effect) {
                    app.mark_copied(&copied, ctx.env.now_millis());
                }
            }
        }
        1 => {
            if let Some(effect) = app.download(ctx.api, &file.id) {
                ctx.perform(effect);
            }
        }
        2 => match qr_terminal(&link) {
            Ok(code) => println!("{code}"),
            Err(_) => eprintln!("alert: Unable to generate QR"),
        },
        3 => match app.qr_image(ctx.env, ctx.prefix(), &file.id) {
            Some((name, svg)) => {
                fs::write(&name, svg).with_context(|| format!("failed to write {name}"))?;
                println!("Saved QR code to {name}");
            }
            None => eprintln!("alert: Unable to generate QR"),
        },
        4 => ctx.env.navigate(&link),
        5 => {
            let confirm = Confirm::with_theme(&ctx.theme)
                .with_prompt(format!("Delete {}?", file.file_name))
                .default(false)
                .interact()?;
            if confirm {
                if let Some(effect) = app.delete(ctx.api, &file.id) {
                    ctx.perform(effect);
                }
            }
        }
        _ => app.deselect(),
    }
    Ok(true)
}

fn download_menu(view: &mut DownloadView, ctx: &mut Ctx<'_>) -> Result<bool> {
    let loaded = match view.state() {
        DownloadState::Loading => {
            println!("Loading file information...");
            false
        }
        DownloadState::Error(message) => {
            println!("\n{message}");
            println!("{NOT_FOUND_HINT}\n");
            false
        }
        DownloadState::Loaded(file) => {
            println!("\n--- Shared File ---");
            print_details(file);
            println!("Link:       {}", view.share_link(ctx.env, ctx.prefix()));
            if view.is_copied(ctx.env.now_millis()) {
                println!("            (copied)");
            }
            println!();
            true
        }
    };

    let actions: &[&str] = if loaded {
        &["Download", "Copy link", "Show QR code", "Back", "Exit"]
    } else {
        &["Back", "Exit"]
    };
    let choice = Select::with_theme(&ctx.theme)
        .with_prompt("Action")
        .items(actions)
        .default(0)
        .interact()?;

    match actions[choice] {
        "Download" => {
            if let Some(effect) = view.download(ctx.api) {
                ctx.perform(effect);
            }
        }
        "Copy link" => {
            if let Some(effect) = view.copy_link(ctx.env, ctx.prefix()) {
                if ctx.perform(effect).is_some() {
                    view.mark_copied(ctx.env.now_millis());
                }
            }
        }
        "Show QR code" => match qr_terminal(&view.share_link(ctx.env, ctx.prefix())) {
            Ok(code) => println!("{code}"),
            Err(_) => eprintln!("alert: Unable to generate QR"),
        },
        "Back" => {
            if ctx.runner.run(view.back(), ctx.env) == Outcome::Ignored {
                println!("No previous page.");
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}
