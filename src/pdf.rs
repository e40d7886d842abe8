use crate::canvas::{Command, Document, Page};
use crate::font::{FontSet, FontStyle, winansi_code};
use crate::image::{ImageFilter, PdfImage};
use crate::types::{Color, Pt};
use fixed::types::I32F32;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    pub title: Option<String>,
}

/// Serializes `document` into a complete PDF 1.7 file. Output depends only
/// on the document and options, so equal inputs give identical bytes.
pub fn document_to_pdf(document: &Document, fonts: &FontSet, options: &PdfOptions) -> Vec<u8> {
    // 1: catalog, 2: page tree, 3-4: fonts, then images, pages, info.
    let mut objects: Vec<String> = vec![String::new(), String::new()];
    objects.push(font_object(fonts.base_font_name(FontStyle::Regular)));
    objects.push(font_object(fonts.base_font_name(FontStyle::Bold)));
    let font_entries = [
        (FontStyle::Regular.resource_name().to_string(), 3usize),
        (FontStyle::Bold.resource_name().to_string(), 4usize),
    ];

    let mut image_map: HashMap<String, String> = HashMap::new();
    let mut image_entries: Vec<(String, usize)> = Vec::new();
    for (index, image) in document.images.iter().enumerate() {
        let smask_id = image.alpha.as_ref().map(|alpha| {
            objects.push(image_smask_object(image, alpha));
            objects.len()
        });
        objects.push(image_object(image, smask_id));
        let name = format!("Im{}", index + 1);
        image_entries.push((name.clone(), objects.len()));
        image_map.insert(image.resource_id.clone(), name);
    }

    let resources = format!(
        "<< /Font {} /XObject {} >>",
        resource_dict(&font_entries),
        resource_dict(&image_entries)
    );

    let page_height = document.page_size.height;
    let mut page_ids = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = render_page(page, &image_map);
        objects.push(stream_object(&content));
        let content_id = objects.len();
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources {} /Contents {} 0 R >>",
            fmt_pt(document.page_size.width),
            fmt_pt(page_height),
            resources,
            content_id
        ));
        page_ids.push(objects.len());
    }

    objects[0] = "<< /Type /Catalog /Pages 2 0 R >>".to_string();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    objects[1] = format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        page_ids.len()
    );
    objects.push(info_object(options.title.as_deref()));
    let info_id = objects.len();

    build_pdf(objects, 1, info_id)
}

fn render_page(page: &Page, image_map: &HashMap<String, String>) -> String {
    let mut out = String::new();
    let mut font_resource = FontStyle::Regular.resource_name();
    let mut font_size = Pt::from_i32(12);

    for cmd in &page.commands {
        match cmd {
            Command::SetFillColor(color) => out.push_str(&color_op(*color, "rg")),
            Command::SetStrokeColor(color) => out.push_str(&color_op(*color, "RG")),
            Command::SetLineWidth(width) => out.push_str(&format!("{} w\n", fmt_pt(*width))),
            Command::SetFont { style, size } => {
                font_resource = style.resource_name();
                font_size = *size;
            }
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::Stroke => out.push_str("S\n"),
            Command::DrawString { x, y, text } => {
                out.push_str("BT\n");
                out.push_str(&format!("/{} {} Tf\n", font_resource, fmt_pt(font_size)));
                out.push_str(&format!("{} {} Td\n", fmt_pt(*x), fmt_pt(*y)));
                out.push_str(&format!("({}) Tj\n", encode_winansi_pdf_string(text)));
                out.push_str("ET\n");
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                if let Some(name) = image_map.get(resource_id) {
                    out.push_str("q\n");
                    out.push_str(&format!(
                        "{} 0 0 {} {} {} cm\n",
                        fmt_pt(*width),
                        fmt_pt(*height),
                        fmt_pt(*x),
                        fmt_pt(*y)
                    ));
                    out.push_str(&format!("/{} Do\n", name));
                    out.push_str("Q\n");
                }
            }
        }
    }
    out
}

fn build_pdf(objects: Vec<String>, catalog_id: usize, info_id: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.7\n");
    out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(obj.as_bytes());
        out.extend_from_slice(b"\nendobj\n");
    }

    let file_id = hex_digest(&out);
    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    let trailer = format!(
        "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R /ID [<{}> <{}>] >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        catalog_id,
        info_id,
        file_id,
        file_id,
        xref_start
    );
    out.extend_from_slice(trailer.as_bytes());
    out
}

fn hex_digest(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest[..16].iter().map(|b| format!("{:02X}", b)).collect()
}

fn font_object(base_font: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base_font
    )
}

fn resource_dict(entries: &[(String, usize)]) -> String {
    let items = entries
        .iter()
        .map(|(name, id)| format!("/{} {} 0 R", name, id))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<< {} >>", items)
}

fn image_object(image: &PdfImage, smask_id: Option<usize>) -> String {
    let stream_data = encode_stream_data(&image.data);
    let filters = match image.filter {
        ImageFilter::Dct => "[/ASCIIHexDecode /DCTDecode]",
        ImageFilter::Flate => "[/ASCIIHexDecode /FlateDecode]",
    };
    let smask = smask_id
        .map(|id| format!(" /SMask {} 0 R", id))
        .unwrap_or_default();
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Length {} /Filter {}{} >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        image.color_space,
        stream_data.len(),
        filters,
        smask,
        stream_data
    )
}

fn image_smask_object(image: &PdfImage, alpha: &[u8]) -> String {
    let stream_data = encode_stream_data(alpha);
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray /BitsPerComponent 8 /Length {} /Filter [/ASCIIHexDecode /FlateDecode] >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        stream_data.len(),
        stream_data
    )
}

fn encode_stream_data(data: &[u8]) -> String {
    let mut hex = String::with_capacity(data.len() * 2 + data.len() / 32 + 1);
    for (index, byte) in data.iter().enumerate() {
        hex.push_str(&format!("{:02X}", byte));
        if index % 32 == 31 {
            hex.push('\n');
        }
    }
    hex.push('>');
    hex
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn info_object(title: Option<&str>) -> String {
    let mut entries = Vec::new();
    if let Some(title) = title {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title)));
    }
    entries.push("/Producer (dealpress)".to_string());
    format!("<< {} >>", entries.join(" "))
}

// Text reaching this point has already been checked against WinAnsi by the
// layout context; anything else becomes '?'.
fn encode_winansi_pdf_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let byte = winansi_code(ch).unwrap_or(b'?');
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    out
}

fn color_op(color: Color, op: &str) -> String {
    format!(
        "{} {} {} {}\n",
        fmt(color.r.clamp(0.0, 1.0)),
        fmt(color.g.clamp(0.0, 1.0)),
        fmt(color.b.clamp(0.0, 1.0)),
        op
    )
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{}{}", sign, int_part);
    }
    let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
    while s.ends_with('0') {
        s.pop();
    }
    s
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}
