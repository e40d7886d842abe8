//! The IPO one-pager: company header, business overview prose, financial
//! highlights and peer analysis tables, then product images.

use crate::block::TextBlock;
use crate::font::encodable;
use crate::image::{ImageAsset, ImageSource, placeholder_text};
use crate::input::{money, text_list, text_or_number};
use crate::sanitize::{or_fallback, sanitize};
use crate::script::{Script, Step};
use crate::table::{Column, TableSpec};
use crate::types::Pt;
use crate::wrap::truncate_chars;
use serde::Deserialize;
use std::path::PathBuf;

pub const DOCUMENT_TITLE: &str = "IPO One-Pager";

const MISSING_CELL: &str = "N/A";
const NOT_SPECIFIED: &str = "Not specified";
const NOT_PROVIDED: &str = "Not provided";
const PEER_NAME_CHARS: usize = 15;
const MAX_YEAR_COLUMNS: usize = 4;
const PRODUCT_IMAGE_MAX_WIDTH: i32 = 250;
const PRODUCT_IMAGE_MAX_HEIGHT: i32 = 180;

const FUNDING_TYPES: &[(&str, &str)] = &[
    ("equity", "Equity"),
    ("debt", "Debt"),
    ("convertible", "Convertible Note"),
    ("hybrid", "Hybrid (Equity + Debt)"),
    ("grant", "Grant"),
];

const FUNDING_PURPOSES: &[(&str, &str)] = &[
    ("expansion", "Business Expansion"),
    ("working_capital", "Working Capital"),
    ("product_development", "Product Development"),
    ("debt_refinancing", "Debt Refinancing"),
    ("acquisition", "Acquisition"),
    ("marketing", "Marketing & Sales"),
    ("other", "Other"),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialHighlights {
    #[serde(deserialize_with = "text_list")]
    pub years: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub revenue: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub ebitda: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub pat: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub net_worth: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeerAnalysis {
    #[serde(deserialize_with = "text_list")]
    pub company_names: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub revenue: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub ebitda: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub pat: Vec<Option<String>>,
    #[serde(deserialize_with = "text_list")]
    pub roe: Vec<Option<String>>,
}

/// One uploaded image. The first of `data`, `path` and `url` that is set wins.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageDescriptor {
    pub url: Option<String>,
    pub path: Option<String>,
    pub data: Option<String>,
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnePagerInput {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub incorporation_year: Option<String>,
    pub headquarters: Option<String>,
    pub website: Option<String>,
    pub funding_type: Option<String>,
    pub funding_purpose: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub fundraise_amount: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub pre_money_valuation: Option<String>,
    pub business_overview: Option<String>,
    pub products_services: Option<String>,
    pub target_market: Option<String>,
    pub competitive_advantage: Option<String>,
    pub revenue_model: Option<String>,
    pub use_of_funds: Option<String>,
    pub financial_highlights: Option<FinancialHighlights>,
    pub peer_analysis: Option<PeerAnalysis>,
    pub images: Vec<ImageDescriptor>,
}

/// Display label for a funding type code.
pub fn funding_type_label(code: Option<&str>) -> String {
    lookup_label(FUNDING_TYPES, code)
}

/// Display label for a funding purpose code.
pub fn funding_purpose_label(code: Option<&str>) -> String {
    lookup_label(FUNDING_PURPOSES, code)
}

fn lookup_label(table: &[(&str, &str)], code: Option<&str>) -> String {
    let code = match code.map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => return NOT_SPECIFIED.to_string(),
    };
    let key = code.to_ascii_lowercase();
    match table.iter().find(|(k, _)| *k == key) {
        Some((_, label)) => label.to_string(),
        None => title_case(&sanitize(code)),
    }
}

fn title_case(code: &str) -> String {
    code.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell(series: &[Option<String>], index: usize) -> String {
    series
        .get(index)
        .and_then(|v| v.as_deref())
        .map(sanitize)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| MISSING_CELL.to_string())
}

const FIN_METRIC_X: f32 = 50.0;
const FIN_YEAR_XS: [f32; MAX_YEAR_COLUMNS] = [200.0, 290.0, 380.0, 470.0];

fn financial_table(fin: &FinancialHighlights) -> Option<TableSpec> {
    let series: [(&str, &Vec<Option<String>>); 4] = [
        ("Revenue", &fin.revenue),
        ("EBITDA", &fin.ebitda),
        ("PAT", &fin.pat),
        ("Net Worth", &fin.net_worth),
    ];
    let width = fin
        .years
        .len()
        .max(series.iter().map(|(_, s)| s.len()).max().unwrap_or(0))
        .min(MAX_YEAR_COLUMNS);
    if width == 0 {
        return None;
    }
    let mut columns = vec![Column::new("Metric", FIN_METRIC_X)];
    for (idx, x) in FIN_YEAR_XS.iter().take(width).enumerate() {
        let label = match fin.years.get(idx).and_then(|y| y.as_deref()) {
            Some(year) if !year.trim().is_empty() => sanitize(year.trim()),
            _ => format!("Year {}", idx + 1),
        };
        columns.push(Column::new(label, *x));
    }
    let rows = series
        .iter()
        .map(|(label, values)| {
            let mut row = vec![label.to_string()];
            row.extend((0..width).map(|idx| cell(values, idx)));
            row
        })
        .collect();
    Some(TableSpec::new(columns).with_rows(rows))
}

const PEER_COLUMNS: [(&str, f32); 5] = [
    ("Company", 50.0),
    ("Revenue", 170.0),
    ("EBITDA", 270.0),
    ("PAT", 370.0),
    ("ROE", 470.0),
];

fn peer_table(peers: &PeerAnalysis) -> Option<TableSpec> {
    if peers.company_names.is_empty() {
        return None;
    }
    let columns = PEER_COLUMNS
        .iter()
        .map(|(label, x)| Column::new(*label, *x))
        .collect();
    let rows = (0..peers.company_names.len())
        .map(|idx| {
            vec![
                truncate_chars(&cell(&peers.company_names, idx), PEER_NAME_CHARS),
                cell(&peers.revenue, idx),
                cell(&peers.ebitda, idx),
                cell(&peers.pat, idx),
                cell(&peers.roe, idx),
            ]
        })
        .collect();
    Some(TableSpec::new(columns).with_rows(rows))
}

fn image_asset(descriptor: &ImageDescriptor, index: usize) -> Option<ImageAsset> {
    let name = or_fallback(
        descriptor.original_name.as_deref(),
        &format!("Image {}", index + 1),
    );
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let source = if let Some(data) = present(&descriptor.data) {
        ImageSource::Data(data)
    } else if let Some(path) = present(&descriptor.path) {
        ImageSource::Path(PathBuf::from(path))
    } else {
        ImageSource::Url(present(&descriptor.url)?)
    };
    Some(ImageAsset::new(name, source))
}

/// Uppercases `text` for display. A character whose uppercase form the
/// built-in fonts cannot draw (`µ` becomes Greek `Μ`) keeps its original form.
fn display_upper(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let upper: String = ch.to_uppercase().collect();
        if upper.chars().all(encodable) {
            out.push_str(&upper);
        } else {
            out.push(ch);
        }
    }
    sanitize(&out)
}

fn prose(script: &mut Script, label: &str, text: Option<&str>) {
    script
        .push(Step::Paragraph(
            TextBlock::new(label).bold().size(10.5).gap_after(2.0),
        ))
        .paragraph(or_fallback(text, NOT_PROVIDED));
}

/// Builds the one-pager script. Never fails: absent fields and tables render
/// fallback text.
pub fn script(input: &OnePagerInput) -> Script {
    let mut script = Script::new();
    let company = or_fallback(input.company_name.as_deref(), "Company");
    let amount = |value: &Option<String>| {
        value
            .as_deref()
            .map(|v| money(&sanitize(v)))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    };

    script
        .section("header")
        .push(Step::Title(display_upper(&company)))
        .push(Step::Subtitle(DOCUMENT_TITLE.into()))
        .label_value("Sector:", or_fallback(input.sector.as_deref(), NOT_SPECIFIED))
        .label_value(
            "Incorporated:",
            or_fallback(input.incorporation_year.as_deref(), NOT_SPECIFIED),
        )
        .label_value(
            "Headquarters:",
            or_fallback(input.headquarters.as_deref(), NOT_SPECIFIED),
        )
        .label_value("Website:", or_fallback(input.website.as_deref(), NOT_SPECIFIED))
        .label_value("Funding Type:", funding_type_label(input.funding_type.as_deref()))
        .label_value(
            "Funding Purpose:",
            funding_purpose_label(input.funding_purpose.as_deref()),
        )
        .label_value("Amount Sought:", amount(&input.fundraise_amount))
        .label_value("Pre-money Valuation:", amount(&input.pre_money_valuation))
        .push(Step::Rule);

    script.section("overview").heading("Business Overview");
    prose(&mut script, "About the Company", input.business_overview.as_deref());
    prose(&mut script, "Products & Services", input.products_services.as_deref());
    prose(&mut script, "Target Market", input.target_market.as_deref());
    prose(&mut script, "Competitive Advantage", input.competitive_advantage.as_deref());
    prose(&mut script, "Revenue Model", input.revenue_model.as_deref());
    prose(&mut script, "Use of Funds", input.use_of_funds.as_deref());

    script.section("financials").heading("Financial Highlights");
    match input.financial_highlights.as_ref().and_then(financial_table) {
        Some(table) => script.push(Step::Table(table)),
        None => script.paragraph("Financial highlights not provided."),
    };

    script.section("peers").heading("Peer Analysis");
    match input.peer_analysis.as_ref().and_then(peer_table) {
        Some(table) => script.push(Step::Table(table)),
        None => script.paragraph("Peer analysis not provided."),
    };

    if !input.images.is_empty() {
        script.section("images").heading("Product Images");
        for (idx, descriptor) in input.images.iter().enumerate() {
            match image_asset(descriptor, idx) {
                Some(asset) => script.push(Step::Image {
                    asset,
                    max_width: Pt::from_i32(PRODUCT_IMAGE_MAX_WIDTH),
                    max_height: Pt::from_i32(PRODUCT_IMAGE_MAX_HEIGHT),
                }),
                None => {
                    let name = or_fallback(
                        descriptor.original_name.as_deref(),
                        &format!("Image {}", idx + 1),
                    );
                    script.paragraph(placeholder_text(&name))
                }
            };
        }
    }

    script
        .section("disclaimer")
        .push(Step::Rule)
        .push(Step::Paragraph(
            TextBlock::new(
                "This one-pager is prepared from information supplied by the company and is for information purposes only. It does not constitute an offer or solicitation to subscribe to any securities.",
            )
            .size(8.0),
        ));
    script
}
