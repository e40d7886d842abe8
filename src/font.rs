use crate::error::{DocError, Result};
use crate::types::Pt;

/// Weight a piece of text is set in. Each maps to one of the built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }
}

/// Advance widths for one built-in Type1 face, in 1/1000 em, indexed by
/// WinAnsi code.
#[derive(Debug)]
pub(crate) struct FaceMetrics {
    widths: [u16; 256],
    missing_width: u16,
}

impl FaceMetrics {
    fn advance(&self, code: u8) -> u16 {
        let width = self.widths[code as usize];
        if width == 0 { self.missing_width } else { width }
    }

    fn measure(&self, font_size: Pt, text: &str) -> Pt {
        let mut total_units: i32 = 0;
        for ch in text.chars() {
            let adv = match winansi_code(ch) {
                Some(code) => self.advance(code),
                None => self.missing_width,
            };
            total_units = total_units.saturating_add(adv as i32);
        }
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

/// The two faces a document is typeset with. Only the Helvetica family is
/// built in; the oblique names resolve to the upright metrics.
#[derive(Debug, Clone)]
pub struct FontSet {
    regular_name: &'static str,
    bold_name: &'static str,
    regular: &'static FaceMetrics,
    bold: &'static FaceMetrics,
}

impl FontSet {
    pub fn standard() -> Self {
        Self {
            regular_name: "Helvetica",
            bold_name: "Helvetica-Bold",
            regular: &HELVETICA,
            bold: &HELVETICA_BOLD,
        }
    }

    pub fn resolve(regular: &str, bold: &str) -> Result<Self> {
        let (regular_name, regular_metrics) = lookup_face(regular)?;
        let (bold_name, bold_metrics) = lookup_face(bold)?;
        Ok(Self {
            regular_name,
            bold_name,
            regular: regular_metrics,
            bold: bold_metrics,
        })
    }

    pub fn base_font_name(&self, style: FontStyle) -> &'static str {
        match style {
            FontStyle::Regular => self.regular_name,
            FontStyle::Bold => self.bold_name,
        }
    }

    pub fn measure(&self, style: FontStyle, font_size: Pt, text: &str) -> Pt {
        let face = match style {
            FontStyle::Regular => self.regular,
            FontStyle::Bold => self.bold,
        };
        face.measure(font_size, text)
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::standard()
    }
}

fn lookup_face(name: &str) -> Result<(&'static str, &'static FaceMetrics)> {
    match name.trim() {
        "Helvetica" => Ok(("Helvetica", &HELVETICA)),
        "Helvetica-Oblique" => Ok(("Helvetica-Oblique", &HELVETICA)),
        "Helvetica-Bold" => Ok(("Helvetica-Bold", &HELVETICA_BOLD)),
        "Helvetica-BoldOblique" => Ok(("Helvetica-BoldOblique", &HELVETICA_BOLD)),
        other => Err(DocError::FontUnavailable(other.to_string())),
    }
}

/// WinAnsi (cp1252) code for `ch`, or `None` when the built-in faces have no
/// glyph for it.
pub(crate) fn winansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{0020}'..='\u{007E}' => ch as u8,
        '\u{00A0}'..='\u{00FF}' => ch as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Whether the built-in faces can draw `ch`.
pub fn encodable(ch: char) -> bool {
    winansi_code(ch).is_some()
}

/// Characters of `text` that have no WinAnsi code, in order of appearance.
pub(crate) fn unencodable_chars(text: &str) -> Vec<char> {
    text.chars().filter(|ch| !encodable(*ch)).collect()
}

// Adobe AFM advance widths mapped through WinAnsiEncoding.
#[rustfmt::skip]
static HELVETICA: FaceMetrics = FaceMetrics {
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
        556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
        0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
    missing_width: 556,
};

#[rustfmt::skip]
static HELVETICA_BOLD: FaceMetrics = FaceMetrics {
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
        556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
        0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ],
    missing_width: 611,
};
