//! Timer badge rasterization

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};

/// Default badge edge length in pixels
pub const DEFAULT_BADGE_SIZE: u32 = 120;

/// Fill colour of the badge disc (accent orange, ~80% opaque)
const BADGE_FILL: [u8; 4] = [255, 111, 0, 204];

/// Render the badge: a filled, semi-transparent disc on a transparent square.
///
/// Edge pixels get partial coverage so the disc is anti-aliased.
pub fn render_badge(size: u32) -> RgbaImage {
    let radius = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let distance = (dx * dx + dy * dy).sqrt();
        let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
        let alpha = (BADGE_FILL[3] as f32 * coverage).round() as u8;
        Rgba([BADGE_FILL[0], BADGE_FILL[1], BADGE_FILL[2], alpha])
    })
}

/// Write the badge PNG to `path`
pub fn create_badge(path: &Path, size: u32) -> RenderResult<()> {
    if size == 0 {
        return Err(RenderError::Asset {
            path: path.display().to_string(),
            message: "badge size must be greater than zero".to_string(),
        });
    }

    render_badge(size)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| RenderError::Asset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), size, "Badge written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_badge_geometry() {
        let badge = render_badge(DEFAULT_BADGE_SIZE);
        assert_eq!(badge.dimensions(), (120, 120));

        // corners are transparent, centre carries the fill
        assert_eq!(badge.get_pixel(0, 0)[3], 0);
        assert_eq!(badge.get_pixel(119, 119)[3], 0);
        assert_eq!(badge.get_pixel(60, 60).0, BADGE_FILL);
    }

    #[test]
    fn test_badge_edge_is_antialiased() {
        let badge = render_badge(64);
        let partial = badge
            .pixels()
            .filter(|p| p[3] > 0 && p[3] < BADGE_FILL[3])
            .count();
        assert!(partial > 0);
    }

    #[test]
    fn test_badge_is_deterministic() {
        assert_eq!(render_badge(48), render_badge(48));
    }

    #[test]
    fn test_create_badge_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("badge.png");
        create_badge(&path, 32).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded, render_badge(32));
    }

    #[test]
    fn test_unwritable_path_is_asset_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("badge.png");
        let err = create_badge(&path, 32).unwrap_err();
        assert!(matches!(err, RenderError::Asset { .. }));
    }
}
