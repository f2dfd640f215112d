//! QR codes for share links.

use qrcode::render::{svg, unicode};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};

pub const MIN_QR_SIZE: u32 = 150;
pub const MAX_QR_SIZE: u32 = 200;

/// Fixed size of the file manager's detail-view QR.
pub const DETAIL_QR_SIZE: u32 = 256;

/// Narrow layouts stack their controls vertically below this width.
pub const NARROW_VIEWPORT: u32 = 480;

/// Share-page QR edge length in pixels: 35% of the viewport, kept within
/// 150..=200.
pub fn qr_size(viewport_width: u32) -> u32 {
    (viewport_width as f64 * 0.35).round().clamp(MIN_QR_SIZE as f64, MAX_QR_SIZE as f64) as u32
}

pub fn is_narrow(viewport_width: u32) -> bool {
    viewport_width < NARROW_VIEWPORT
}

fn encode(text: &str) -> Result<QrCode, QrError> {
    QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H)
}

/// SVG document for `text`, at least `size` pixels square, quiet zone included.
pub fn qr_svg(text: &str, size: u32) -> Result<String, QrError> {
    let code = encode(text)?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .build())
}

/// Half-block rendering for terminals with a dark background.
pub fn qr_terminal(text: &str) -> Result<String, QrError> {
    let code = encode(text)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}

/// File name used when saving a record's QR image.
pub fn qr_file_name(file_name: &str) -> String {
    format!("{file_name}-qrcode.svg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tracks_viewport_within_bounds() {
        assert_eq!(qr_size(320), 150);
        assert_eq!(qr_size(500), 175);
        assert_eq!(qr_size(1920), 200);
    }

    #[test]
    fn narrow_threshold() {
        assert!(is_narrow(479));
        assert!(!is_narrow(480));
    }

    #[test]
    fn svg_output_is_an_svg_document() {
        let svg = qr_svg("http://localhost:5173/#/file/abc&_t=1", 200).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn terminal_output_has_rows() {
        let text = qr_terminal("http://localhost:5173/#/file/abc&_t=1").unwrap();
        assert!(text.lines().count() > 10);
    }

    #[test]
    fn oversized_payload_is_an_error() {
        let huge = "x".repeat(5_000);
        assert!(qr_svg(&huge, 200).is_err());
    }

    #[test]
    fn qr_file_name_appends_suffix() {
        assert_eq!(qr_file_name("report.pdf"), "report.pdf-qrcode.svg");
    }
}
