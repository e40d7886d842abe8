use crate::error::Result;
use crate::font::FontStyle;
use crate::layout::LayoutContext;
use crate::sanitize::sanitize;
use crate::types::Pt;
use base64::Engine;
use image::GenericImageView;
use sha2::{Digest, Sha256};
use serde_json::json;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Where the bytes of an image come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Base64 payload, bare or wrapped in a `data:` URI.
    Data(String),
    Path(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub name: String,
    pub source: ImageSource,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, source: ImageSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Fetches remote images. Timeouts and authorization belong to the
/// implementation; any error is treated as an image failure.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String>;
}

/// Default fetcher: remote images always fall back to their placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectRemote;

impl ImageFetcher for RejectRemote {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        Err(format!("no image fetcher configured for {url}"))
    }
}

/// Raster formats the embedder can decode, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

    fn sniff_base64(payload: &str) -> Option<Self> {
        let payload = payload.trim_start();
        if payload.starts_with("iVBORw0") {
            Some(ImageFormat::Png)
        } else if payload.starts_with("/9j/") {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    fn sniff_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        if mime.contains("png") {
            Some(ImageFormat::Png)
        } else if mime.contains("jpeg") || mime.contains("jpg") {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// The sniffed format first, then every other format.
    fn attempts(hint: Option<Self>) -> Vec<Self> {
        let mut order = Vec::with_capacity(Self::ALL.len());
        if let Some(hint) = hint {
            order.push(hint);
        }
        for format in Self::ALL {
            if !order.contains(&format) {
                order.push(format);
            }
        }
        order
    }

    fn decode(self, bytes: &[u8]) -> std::result::Result<PdfImage, String> {
        let format = match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        };
        let decoded =
            image::load_from_memory_with_format(bytes, format).map_err(|err| err.to_string())?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err("image has no pixels".to_string());
        }
        match self {
            ImageFormat::Jpeg => match jpeg_color_space(jpeg_components(bytes)) {
                Some(color_space) => Ok(PdfImage::new(
                    width,
                    height,
                    color_space,
                    ImageFilter::Dct,
                    bytes.to_vec(),
                    None,
                )),
                None => Ok(flate_rgb(&decoded, false)),
            },
            ImageFormat::Png => Ok(flate_rgb(&decoded, true)),
        }
    }
}

/// Color space for passing JPEG data through untouched. CMYK and anything
/// unrecognised gets `None` and is re-encoded from the decoded RGB pixels.
fn jpeg_color_space(components: Option<u8>) -> Option<&'static str> {
    match components {
        Some(1) => Some("/DeviceGray"),
        Some(3) => Some("/DeviceRGB"),
        _ => None,
    }
}

/// Component count from the first start-of-frame segment.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill byte
            0xFF => pos += 1,
            0x01 | 0xD0..=0xD7 => pos += 2,
            0xD9 | 0xDA => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return bytes.get(pos + 9).copied();
            }
            _ => {
                let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
                pos += 2 + len;
            }
        }
    }
    None
}

/// RGB samples plus an optional soft mask, both Flate-compressed.
fn flate_rgb(decoded: &image::DynamicImage, keep_alpha: bool) -> PdfImage {
    let (width, height) = decoded.dimensions();
    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        if a != 255 {
            has_alpha = true;
        }
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }
    let alpha = (keep_alpha && has_alpha).then(|| flate_compress(&alpha));
    PdfImage::new(
        width,
        height,
        "/DeviceRGB",
        ImageFilter::Flate,
        flate_compress(&rgb),
        alpha,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    Dct,
    Flate,
}

/// Pixel data ready to be written as an image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfImage {
    pub resource_id: String,
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub filter: ImageFilter,
    pub data: Vec<u8>,
    // Flate-compressed 8-bit soft mask, present when any pixel is translucent.
    pub alpha: Option<Vec<u8>>,
    pub(crate) content_hash: u64,
}

impl PdfImage {
    fn new(
        width: u32,
        height: u32,
        color_space: &'static str,
        filter: ImageFilter,
        data: Vec<u8>,
        alpha: Option<Vec<u8>>,
    ) -> Self {
        let content_hash = hash_bytes(&data, alpha.as_deref());
        Self {
            resource_id: format!("img:{content_hash:016x}"),
            width,
            height,
            color_space,
            filter,
            data,
            alpha,
            content_hash,
        }
    }
}

/// A registered image and its size in points at 72 dpi.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub resource_id: String,
    pub natural_width: Pt,
    pub natural_height: Pt,
}

impl EmbeddedImage {
    /// Scales to fit the box while preserving aspect ratio.
    pub fn fit(&self, max_width: Pt, max_height: Pt) -> (Pt, Pt) {
        let natural_w = self.natural_width.to_f32();
        let natural_h = self.natural_height.to_f32();
        if natural_w <= 0.0 || natural_h <= 0.0 {
            return (Pt::ZERO, Pt::ZERO);
        }
        let scale = (max_width.to_f32() / natural_w).min(max_height.to_f32() / natural_h);
        (self.natural_width * scale, self.natural_height * scale)
    }
}

#[derive(Debug)]
enum ImageFailure {
    Fetch(String),
    Read(std::io::Error),
    Base64(base64::DecodeError),
    Decode(String),
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFailure::Fetch(message) => write!(f, "fetch failed: {}", message),
            ImageFailure::Read(err) => write!(f, "read failed: {}", err),
            ImageFailure::Base64(err) => write!(f, "invalid base64: {}", err),
            ImageFailure::Decode(message) => write!(f, "decode failed: {}", message),
        }
    }
}

fn load_bytes(
    source: &ImageSource,
    fetcher: &dyn ImageFetcher,
) -> std::result::Result<(Vec<u8>, Option<ImageFormat>), ImageFailure> {
    match source {
        ImageSource::Data(payload) => {
            let (mime, payload) = split_data_uri(payload);
            let hint = mime
                .and_then(ImageFormat::from_mime)
                .or_else(|| ImageFormat::sniff_base64(payload));
            let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(cleaned.as_bytes())
                .map_err(ImageFailure::Base64)?;
            Ok((bytes, hint))
        }
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(ImageFailure::Read)?;
            let hint = ImageFormat::sniff_bytes(&bytes);
            Ok((bytes, hint))
        }
        ImageSource::Url(url) => {
            let bytes = fetcher.fetch(url).map_err(ImageFailure::Fetch)?;
            let hint = ImageFormat::sniff_bytes(&bytes);
            Ok((bytes, hint))
        }
        ImageSource::Bytes(bytes) => Ok((bytes.clone(), ImageFormat::sniff_bytes(bytes))),
    }
}

// Returns the mime type of a `data:` URI and its payload; a bare payload is
// returned unchanged.
fn split_data_uri(raw: &str) -> (Option<&str>, &str) {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix("data:") else {
        return (None, raw);
    };
    match rest.split_once(',') {
        Some((header, payload)) => (header.split(';').next(), payload),
        None => (None, rest),
    }
}

fn decode_any(
    bytes: &[u8],
    hint: Option<ImageFormat>,
) -> std::result::Result<PdfImage, ImageFailure> {
    let mut errors = Vec::new();
    for format in ImageFormat::attempts(hint) {
        match format.decode(bytes) {
            Ok(image) => return Ok(image),
            Err(err) => errors.push(format!("{:?}: {}", format, err)),
        }
    }
    Err(ImageFailure::Decode(errors.join("; ")))
}

/// Decodes and registers `asset`. Returns `None` on any failure; the failure
/// is logged and counted, never propagated.
pub fn embed(ctx: &mut LayoutContext<'_>, asset: &ImageAsset) -> Option<EmbeddedImage> {
    let decoded = load_bytes(&asset.source, ctx.fetcher)
        .and_then(|(bytes, hint)| decode_any(&bytes, hint));
    match decoded {
        Ok(image) => {
            let natural_width = Pt::from_i32(image.width as i32);
            let natural_height = Pt::from_i32(image.height as i32);
            let before = ctx.canvas.image_count();
            let resource_id = ctx.canvas.register_image(image);
            if ctx.canvas.image_count() > before {
                ctx.stats.images_embedded += 1;
            }
            if let Some(debug) = ctx.debug {
                debug.event(
                    "image.embedded",
                    &[
                        ("name", json!(asset.name)),
                        ("resource", json!(resource_id)),
                    ],
                );
            }
            Some(EmbeddedImage {
                resource_id,
                natural_width,
                natural_height,
            })
        }
        Err(failure) => {
            ctx.stats.image_fallbacks += 1;
            log::warn!(
                "image '{}' in section '{}' replaced by placeholder: {}",
                asset.name,
                ctx.section(),
                failure
            );
            if let Some(debug) = ctx.debug {
                debug.event(
                    "image.fallback",
                    &[
                        ("name", json!(asset.name)),
                        ("section", json!(ctx.section())),
                        ("reason", json!(failure.to_string())),
                    ],
                );
            }
            None
        }
    }
}

/// Text drawn where an image could not be embedded.
pub fn placeholder_text(name: &str) -> String {
    let name = sanitize(name);
    let name = name.trim();
    if name.is_empty() {
        "[Image]".to_string()
    } else {
        format!("[Image: {}]", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Image { width: Pt, height: Pt },
    Placeholder,
}

/// Places `asset` at `x` below the cursor, scaled into the box. An image is
/// never split: a new page is started first when it does not fit. On failure
/// a one-line placeholder takes its place.
pub fn place_image(
    ctx: &mut LayoutContext<'_>,
    asset: &ImageAsset,
    x: Pt,
    max_width: Pt,
    max_height: Pt,
    gap_after: Pt,
) -> Result<Placement> {
    match embed(ctx, asset) {
        Some(embedded) => {
            let (width, height) = embedded.fit(max_width, max_height);
            ctx.ensure_space(height);
            let y = ctx.cursor.y() - height;
            ctx.canvas
                .draw_image(x, y, width, height, embedded.resource_id);
            ctx.advance(height + gap_after);
            Ok(Placement::Image { width, height })
        }
        None => {
            let size = Pt::from_i32(10);
            let line_height = Pt::from_i32(14);
            ctx.ensure_space(line_height);
            let y = ctx.cursor.y();
            ctx.draw_text(x, y, FontStyle::Regular, size, &placeholder_text(&asset.name))?;
            ctx.advance(line_height + gap_after);
            Ok(Placement::Placeholder)
        }
    }
}

fn flate_compress(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// First eight bytes of the SHA-256 of the samples and soft mask.
fn hash_bytes(data: &[u8], alpha: Option<&[u8]>) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update((data.len() as u64).to_be_bytes());
    hasher.update(data);
    if let Some(alpha) = alpha {
        hasher.update([1u8]);
        hasher.update(alpha);
    }
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use base64::Engine;
    use std::io::Cursor;

    pub fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 80, 160, alpha]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    pub fn gray_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::GrayImage::from_pixel(width, height, image::Luma([90]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    pub fn base64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }
}
