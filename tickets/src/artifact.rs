//! Visual artifact rendering.
//!
//! Encodes a payload into a QR code at error-correction level M, scales the
//! matrix by an integer factor onto a fixed square canvas, recolours it
//! pixel-wise to the configured palette and serializes it as a base64 PNG.
//!
//! Rendering is pure: the same payload and style always produce the same bytes.

use crate::config::ArtifactStyle;
use crate::constants::artifact::{DARK_LUMA, LIGHT_LUMA, QUIET_ZONE_MODULES};
use crate::error::RenderError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

/// Rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Raw PNG bytes. The digest is computed over these.
    pub png: Vec<u8>,

    /// Standard base64 of `png`; contains only `[A-Za-z0-9+/=]`.
    pub encoded: String,
}

/// Renders payloads into styled QR code PNGs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRenderer {
    style: ArtifactStyle,
}

impl ArtifactRenderer {
    /// Renderer using `style`.
    #[must_use]
    pub const fn new(style: ArtifactStyle) -> Self {
        Self { style }
    }

    /// Style in use.
    #[must_use]
    pub const fn style(&self) -> ArtifactStyle {
        self.style
    }

    /// Render `payload` into a styled, transport-encoded PNG.
    ///
    /// # Errors
    ///
    /// - [`RenderError::PayloadTooLarge`] if the payload does not fit a
    ///   version 40 symbol at level M; the payload is never truncated
    /// - [`RenderError::ResolutionTooSmall`] if the size cannot hold one
    ///   pixel per module; never returned for a style that passes
    ///   [`ArtifactStyle::validate`]
    /// - [`RenderError::Image`] if PNG encoding fails
    pub fn render(&self, payload: &str) -> Result<Artifact, RenderError> {
        let matrix = encode_matrix(payload)?;
        let scaled = scale_to_square(&matrix, self.style.size)?;
        let styled = recolor(&scaled, &self.style);

        let mut png = Vec::new();
        styled
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RenderError::Image(e.to_string()))?;

        let encoded = STANDARD.encode(&png);
        tracing::debug!(
            payload_len = payload.len(),
            png_len = png.len(),
            "Rendered ticket artifact"
        );

        Ok(Artifact { png, encoded })
    }
}

impl Default for ArtifactRenderer {
    fn default() -> Self {
        Self::new(ArtifactStyle::default())
    }
}

/// QR matrix as a one-pixel-per-module greyscale image, quiet zone included.
fn encode_matrix(payload: &str) -> Result<GrayImage, RenderError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M).map_err(
        |e| match e {
            QrError::DataTooLong => RenderError::PayloadTooLarge { len: payload.len() },
            other => RenderError::Encoding(other.to_string()),
        },
    )?;

    let width = u32::try_from(code.width())
        .map_err(|_| RenderError::Encoding("matrix width overflow".to_string()))?;
    let colors = code.to_colors();
    let side = width + 2 * QUIET_ZONE_MODULES;

    Ok(GrayImage::from_fn(side, side, |x, y| {
        let inside = |v: u32| v >= QUIET_ZONE_MODULES && v < QUIET_ZONE_MODULES + width;
        if inside(x) && inside(y) {
            let (mx, my) = (x - QUIET_ZONE_MODULES, y - QUIET_ZONE_MODULES);
            let index = (my * width + mx) as usize;
            if colors.get(index) == Some(&Color::Dark) {
                return Luma([DARK_LUMA]);
            }
        }
        Luma([LIGHT_LUMA])
    }))
}

/// Nearest-neighbour upscale by the largest integer factor that fits,
/// centred on a `size`×`size` light canvas.
fn scale_to_square(matrix: &GrayImage, size: u32) -> Result<GrayImage, RenderError> {
    let modules = matrix.width();
    if modules == 0 || modules > size {
        return Err(RenderError::ResolutionTooSmall { modules, size });
    }

    let factor = size / modules;
    let offset = (size - modules * factor) / 2;
    let end = offset + modules * factor;

    Ok(GrayImage::from_fn(size, size, |x, y| {
        if (offset..end).contains(&x) && (offset..end).contains(&y) {
            *matrix.get_pixel((x - offset) / factor, (y - offset) / factor)
        } else {
            Luma([LIGHT_LUMA])
        }
    }))
}

/// Dark samples become the foreground colour; everything else the background.
fn recolor(image: &GrayImage, style: &ArtifactStyle) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] == DARK_LUMA {
            Rgba(style.foreground)
        } else {
            Rgba(style.background)
        }
    })
}
