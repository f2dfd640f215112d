//! HTML snapshots of the two views.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::app::AppShell;
use crate::download_view::{DownloadState, DownloadView, NOT_FOUND_HINT};
use crate::env::Environment;
use crate::qr::{DETAIL_QR_SIZE, is_narrow, qr_svg};
use crate::record::{FileRecord, format_file_size, format_time};
use crate::shell::{Shell, View};

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; color: #333; }
header { padding: 16px 24px; background: #667eea; color: #fff; }
main { padding: 24px; max-width: 960px; margin: 0 auto; }
.files-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 16px; }
.file-card { background: #fff; border-radius: 8px; padding: 16px; }
.file-name { font-weight: bold; word-break: break-word; }
.file-size, .file-time { color: #666; font-size: 13px; }
.empty-state { text-align: center; color: #999; padding: 48px; }
.detail-view, .card { background: #fff; border-radius: 12px; padding: 24px; }
.qr { display: flex; justify-content: center; background: #f9f9f9; border-radius: 8px; padding: 16px; }
.info-item { display: flex; justify-content: space-between; padding: 4px 0; }
.info-label { color: #999; }
.share-link-box, .actions { display: flex; gap: 8px; margin-top: 16px; }
.narrow .share-link-box, .narrow .actions { flex-direction: column; }
.share-link-input { flex: 1; font-family: monospace; padding: 8px; }
.copied { color: #4caf50; }
.status { text-align: center; padding: 48px; }
.status .error { color: #d32f2f; }
.hint { color: #999; font-size: 14px; }
"#;

/// Full HTML page for whatever the shell currently shows.
pub fn render_shell(shell: &Shell<'_>) -> Markup {
    let env = shell.env();
    let prefix = &shell.config().share_hash_prefix;
    match shell.view() {
        View::Main(app) => render_main(app, env, prefix),
        View::Download(view) => render_download(view, env, prefix),
    }
}

fn page(title: &str, narrow: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body class=[narrow.then_some("narrow")] {
                (body)
            }
        }
    }
}

fn qr_block(link: &str, size: u32) -> Markup {
    match qr_svg(link, size) {
        Ok(svg) => {
            // inline: drop the XML declaration
            let start = svg.find("<svg").unwrap_or(0);
            html! { div.qr { (PreEscaped(&svg[start..])) } }
        }
        Err(_) => html! { div.qr { "Unable to generate QR" } },
    }
}

fn info_item(label: &str, value: &str) -> Markup {
    html! {
        div.info-item {
            span.info-label { (label) }
            span.info-value { (value) }
        }
    }
}

/// File manager: the grid, or the detail view when a file is selected.
pub fn render_main(app: &AppShell, env: &dyn Environment, prefix: &str) -> Markup {
    let now = env.now_millis();
    let body = html! {
        header {
            h1 { "File share" }
            p { "Upload files and share them with a link or QR code" }
        }
        main {
            @if let Some(file) = app.selected() {
                (detail(app, file, env, prefix, now))
            } @else {
                (grid(app, now))
            }
        }
    };
    page("File share", is_narrow(env.viewport_width()), body)
}

fn grid(app: &AppShell, now: u64) -> Markup {
    html! {
        div.file-list-container {
            h2 { "My files (" (app.files().len()) ")" }
            @if app.files().is_empty() {
                div.empty-state {
                    h3 { "No files uploaded yet" }
                    p { "Upload a file to start sharing" }
                }
            } @else {
                div.files-grid {
                    @for file in app.files() {
                        div.file-card data-id=(file.id) {
                            div.file-name { (file.file_name) }
                            div.file-size { (format_file_size(file.file_size)) }
                            div.file-time { (format_time(&file.upload_time)) }
                            @if app.is_copied(&file.id, now) {
                                div.copied { "Copied" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn detail(
    app: &AppShell,
    file: &FileRecord,
    env: &dyn Environment,
    prefix: &str,
    now: u64,
) -> Markup {
    let link = app.share_link(env, prefix, &file.id).unwrap_or_default();
    html! {
        div.detail-view {
            (qr_block(&link, DETAIL_QR_SIZE))
            div.share-section {
                h2 { "Share link" }
                div.file-info {
                    (info_item("File name", &file.file_name))
                    (info_item("Size", &format_file_size(file.file_size)))
                    (info_item("Uploaded", &format_time(&file.upload_time)))
                    (info_item("Expires", &format_time(&file.expiry_time)))
                    (info_item("Downloads", &file.download_count.to_string()))
                }
                div.share-link-box {
                    input.share-link-input type="text" readonly value=(link);
                    @if app.is_copied(&file.id, now) {
                        span.copied { "Copied" }
                    }
                }
            }
        }
    }
}

/// Landing page for a shared link.
pub fn render_download(view: &DownloadView, env: &dyn Environment, prefix: &str) -> Markup {
    let narrow = is_narrow(env.viewport_width());
    let body = match view.state() {
        DownloadState::Loading => html! {
            div.status { p { "Loading file information..." } }
        },
        DownloadState::Error(message) => html! {
            div.status {
                p.error { (message) }
                p.hint { (NOT_FOUND_HINT) }
            }
        },
        DownloadState::Loaded(file) => {
            let link = view.share_link(env, prefix);
            html! {
                main {
                    div.card {
                        h1 { (file.file_name) }
                        div.file-info {
                            (info_item("Size", &format_file_size(file.file_size)))
                            (info_item("Downloads", &file.download_count.to_string()))
                            (info_item("Uploaded", &format_time(&file.upload_time)))
                            (info_item("Expires", &format_time(&file.expiry_time)))
                        }
                        h2 { "Share QR code" }
                        (qr_block(&link, view.qr_size(env)))
                        div.share-link-box {
                            input.share-link-input type="text" readonly value=(link);
                            @if view.is_copied(env.now_millis()) {
                                span.copied { "Copied" }
                            }
                        }
                        p.hint { "This file expires at " (format_time(&file.expiry_time)) }
                    }
                }
            }
        }
    };
    let title = view
        .file()
        .map(|f| f.file_name.clone())
        .unwrap_or_else(|| "Shared file".to_string());
    page(&title, narrow, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FileApi;
    use crate::config::Config;
    use crate::env::PageEnv;
    use crate::test_utils::{FakeApi, make_record};

    #[test]
    fn empty_list_shows_empty_state() {
        let env = PageEnv::new("http://localhost:5173/");
        let html = render_main(&AppShell::new(), &env, "/file").into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("My files (0)"));
        assert!(html.contains("No files uploaded yet"));
    }

    #[test]
    fn grid_escapes_file_names() {
        let env = PageEnv::new("http://localhost:5173/");
        let mut record = make_record("a");
        record.file_name = "<script>x</script>.txt".to_string();
        let api = FakeApi::with_files(vec![record]);
        let mut app = AppShell::new();
        app.load_files(&api);
        let html = render_main(&app, &env, "/file").into_string();
        assert!(html.contains("My files (1)"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;.txt"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn detail_view_shows_share_link_and_qr() {
        let env = PageEnv::with_manual_clock("http://localhost:5173/", 77);
        let api = FakeApi::with_files(vec![make_record("abc")]);
        let mut app = AppShell::new();
        app.load_files(&api);
        app.select("abc");
        let html = render_main(&app, &env, "/file").into_string();
        assert!(html.contains("http://localhost:5173/#/file/abc&amp;_t=77"));
        assert!(html.contains("<svg"));
        assert!(html.contains("1.5 KB"));
    }

    #[test]
    fn detail_qr_keeps_fixed_size_on_narrow_viewport() {
        let env = PageEnv::with_manual_clock("http://localhost:5173/", 77);
        env.set_viewport_width(360);
        let api = FakeApi::with_files(vec![make_record("abc")]);
        let mut app = AppShell::new();
        app.load_files(&api);
        app.select("abc");
        let link = app.share_link(&env, "/file", "abc").unwrap();
        let expected = qr_block(&link, DETAIL_QR_SIZE).into_string();
        let html = render_main(&app, &env, "/file").into_string();
        assert!(html.contains(&expected));
    }

    #[test]
    fn download_error_page_uses_generic_message() {
        let env = PageEnv::new("http://localhost:5173/#/file/nope");
        let api = FakeApi::default();
        let mut view = DownloadView::new("nope");
        view.apply(api.file_info("nope"));
        let html = render_download(&view, &env, "/file").into_string();
        assert!(html.contains("File not found or expired"));
        assert!(html.contains(NOT_FOUND_HINT));
    }

    #[test]
    fn narrow_viewport_marks_body() {
        let env = PageEnv::new("http://localhost:5173/#/file/abc");
        env.set_viewport_width(400);
        let api = FakeApi::with_files(vec![make_record("abc")]);
        let shell = Shell::mount(&env, &api, Config::default());
        let html = render_shell(&shell).into_string();
        assert!(html.contains("<body class=\"narrow\">"));
        assert!(html.contains("<title>abc.txt</title>"));
    }
}
