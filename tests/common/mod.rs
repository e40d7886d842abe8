#![allow(dead_code)]

use lopdf::Object;
use lopdf::content::Content;

/// One `Tj` text run read back from a produced PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Bottom-left corner and size of one placed image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDraw {
    pub page: usize,
    pub y: f32,
    pub height: f32,
}

fn page_operations(bytes: &[u8]) -> Vec<(usize, Vec<lopdf::content::Operation>)> {
    let doc = lopdf::Document::load_mem(bytes).expect("output parses as PDF");
    doc.get_pages()
        .into_iter()
        .map(|(number, id)| {
            let data = doc.get_page_content(id).expect("page content");
            let content = Content::decode(&data).expect("content stream decodes");
            (number as usize, content.operations)
        })
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("output parses as PDF")
        .get_pages()
        .len()
}

pub fn text_runs(bytes: &[u8]) -> Vec<Run> {
    let mut runs = Vec::new();
    for (page, operations) in page_operations(bytes) {
        let (mut x, mut y) = (0.0, 0.0);
        for op in operations {
            match op.operator.as_str() {
                "Td" if op.operands.len() == 2 => {
                    x = op.operands[0].as_float().unwrap_or_default();
                    y = op.operands[1].as_float().unwrap_or_default();
                }
                "Tj" => {
                    if let Some(Object::String(raw, _)) = op.operands.first() {
                        runs.push(Run {
                            page,
                            x,
                            y,
                            text: String::from_utf8_lossy(raw).into_owned(),
                        });
                    }
                }
                _ => {}
            }
        }
    }
    runs
}

pub fn image_draws(bytes: &[u8]) -> Vec<ImageDraw> {
    let mut draws = Vec::new();
    for (page, operations) in page_operations(bytes) {
        for op in operations {
            if op.operator == "cm" && op.operands.len() == 6 {
                let value = |i: usize| op.operands[i].as_float().unwrap_or_default();
                draws.push(ImageDraw {
                    page,
                    y: value(5),
                    height: value(3),
                });
            }
        }
    }
    draws
}

pub fn png_base64(width: u32, height: u32) -> String {
    use base64::Engine;
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 40, 200, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    base64::engine::general_purpose::STANDARD.encode(out.into_inner())
}
