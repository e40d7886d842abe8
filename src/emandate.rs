//! The fundraising e-mandate contract: header, recitals, numbered clauses,
//! signature blocks, then the fee and company-detail schedules on a page of
//! their own.

use crate::image::{ImageAsset, ImageSource};
use crate::input::{money, text_or_number};
use crate::sanitize::{or_fallback, sanitize};
use crate::script::{Script, SignatureParty, Step};
use crate::table::{Column, TableSpec};
use crate::types::Pt;
use serde::Deserialize;

pub const DOCUMENT_TITLE: &str = "E-Mandate Agreement";

const COMPANY_FALLBACK: &str = "Company";
const FOUNDER_FALLBACK: &str = "Founder Name";
const FOUNDER_TITLE_FALLBACK: &str = "Founder";
const PLATFORM_FALLBACK: &str = "the Platform";
const PLATFORM_SIGNATORY_FALLBACK: &str = "Ankit Khanna";
const PLATFORM_SIGNATORY_TITLE_FALLBACK: &str = "Founder";
const NOT_PROVIDED: &str = "Not provided";
const AS_AGREED: &str = "As mutually agreed";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EMandateInput {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub cin: Option<String>,
    pub founder_name: Option<String>,
    pub founder_title: Option<String>,
    pub agreement_date: Option<String>,
    pub platform_name: Option<String>,
    pub platform_signatory_name: Option<String>,
    pub platform_signatory_title: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub fundraise_amount: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub onboarding_fee: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub success_fee_percent: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub retainer_fee: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub term_months: Option<String>,
    pub jurisdiction: Option<String>,
    /// Base64 image, bare or as a `data:` URI.
    pub company_signature: Option<String>,
    pub platform_signature: Option<String>,
}

// Input with every fallback applied and every string sanitized.
struct Parties {
    company: String,
    address: String,
    founder: String,
    founder_title: String,
    platform: String,
    signatory: String,
    signatory_title: String,
    date: Option<String>,
    jurisdiction: String,
    term: String,
}

impl Parties {
    fn resolve(input: &EMandateInput) -> Self {
        let date = input
            .agreement_date
            .as_deref()
            .map(sanitize)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            company: or_fallback(input.company_name.as_deref(), COMPANY_FALLBACK),
            address: or_fallback(input.company_address.as_deref(), NOT_PROVIDED),
            founder: or_fallback(input.founder_name.as_deref(), FOUNDER_FALLBACK),
            founder_title: or_fallback(input.founder_title.as_deref(), FOUNDER_TITLE_FALLBACK),
            platform: or_fallback(input.platform_name.as_deref(), PLATFORM_FALLBACK),
            signatory: or_fallback(
                input.platform_signatory_name.as_deref(),
                PLATFORM_SIGNATORY_FALLBACK,
            ),
            signatory_title: or_fallback(
                input.platform_signatory_title.as_deref(),
                PLATFORM_SIGNATORY_TITLE_FALLBACK,
            ),
            date,
            jurisdiction: or_fallback(input.jurisdiction.as_deref(), "Mumbai, India"),
            term: or_fallback(input.term_months.as_deref(), "12"),
        }
    }
}

/// Builds the contract script. Never fails: absent fields fall back to fixed
/// strings.
pub fn script(input: &EMandateInput) -> Script {
    let p = Parties::resolve(input);
    let mut script = Script::new();

    script
        .section("header")
        .push(Step::Title("E-MANDATE AGREEMENT".into()))
        .push(Step::Subtitle("Mandate for Fundraising Advisory and Listing Services".into()));
    let made_on = match &p.date {
        Some(date) => format!("This Agreement is made and executed on {}, by and between:", date),
        None => "This Agreement is made and executed on the date of the last signature below, by and between:".to_string(),
    };
    script
        .paragraph(made_on)
        .label_value("Company:", p.company.clone())
        .label_value("Registered Address:", p.address.clone())
        .label_value("Represented by:", format!("{}, {}", p.founder, p.founder_title))
        .paragraph(format!(
            "(hereinafter the \"Company\") of the one part, and {} (hereinafter the \"Platform\"), represented by {}, {}, of the other part.",
            p.platform, p.signatory, p.signatory_title
        ))
        .push(Step::Rule);

    script.section("recitals").heading("RECITALS");
    for recital in [
        format!(
            "A. The Company, {}, intends to raise capital from investors and has approached the Platform for assistance with the same.",
            p.company
        ),
        format!(
            "B. {} operates a technology platform that connects growth-stage companies with accredited investors and provides associated advisory services.",
            capitalize(&p.platform)
        ),
        "C. The parties wish to record the terms on which the Company grants, and the Platform accepts, the mandate described below.".to_string(),
    ] {
        script.paragraph(recital);
    }

    script.section("clauses").heading("NOW, THEREFORE, THE PARTIES AGREE AS FOLLOWS:");
    for (number, heading, paragraphs) in clauses(input, &p) {
        script.push(Step::Clause {
            number: format!("{}.", number),
            heading: heading.to_string(),
            paragraphs,
        });
    }

    script
        .section("signatures")
        .push(Step::Spacer(Pt::from_i32(10)))
        .paragraph("IN WITNESS WHEREOF, the parties have executed this Agreement on the date first written above.")
        .push(Step::Signatures {
            left: SignatureParty {
                heading: format!("For {}", capitalize(&p.platform)),
                name: p.signatory.clone(),
                title: p.signatory_title.clone(),
                date: p.date.clone(),
                signature: signature_asset("platform-signature", &input.platform_signature),
            },
            right: SignatureParty {
                heading: format!("For {}", p.company),
                name: p.founder.clone(),
                title: p.founder_title.clone(),
                date: p.date.clone(),
                signature: signature_asset("company-signature", &input.company_signature),
            },
        });

    script
        .section("schedules")
        .push(Step::PageBreak)
        .heading("SCHEDULE A: FEE STRUCTURE")
        .push(Step::Table(fee_table(input)))
        .paragraph("All fees are exclusive of applicable taxes, which shall be borne by the Company.")
        .heading("SCHEDULE B: COMPANY DETAILS")
        .label_value("Company Name:", p.company.clone())
        .label_value("CIN:", or_fallback(input.cin.as_deref(), NOT_PROVIDED))
        .label_value("Registered Address:", p.address.clone())
        .label_value("Authorised Signatory:", p.founder.clone())
        .label_value("Designation:", p.founder_title.clone())
        .label_value("Email:", or_fallback(input.company_email.as_deref(), NOT_PROVIDED))
        .label_value("Phone:", or_fallback(input.company_phone.as_deref(), NOT_PROVIDED))
        .label_value(
            "Target Raise:",
            input
                .fundraise_amount
                .as_deref()
                .map(|v| money(&sanitize(v)))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        );
    script
}

fn clauses(input: &EMandateInput, p: &Parties) -> Vec<(usize, &'static str, Vec<String>)> {
    let target = input
        .fundraise_amount
        .as_deref()
        .map(|v| money(&sanitize(v)))
        .filter(|v| !v.trim().is_empty());
    let appointment = match target {
        Some(amount) => format!(
            "The Company appoints the Platform on a non-exclusive basis to identify and introduce investors for a proposed raise of up to {}.",
            amount
        ),
        None => "The Company appoints the Platform on a non-exclusive basis to identify and introduce investors for its proposed fundraise.".to_string(),
    };
    vec![
        (1, "Appointment", vec![appointment]),
        (
            2,
            "Scope of Services",
            vec![
                "The Platform shall list the Company's opportunity, prepare investor-facing summaries from information supplied by the Company, and coordinate investor meetings and due diligence requests.".to_string(),
                "The Platform does not guarantee that any investment will be made and shall not be responsible for investment decisions of any investor.".to_string(),
            ],
        ),
        (
            3,
            "Fees",
            vec!["In consideration of the services, the Company shall pay the fees set out in Schedule A. Success fees fall due within fifteen (15) days of receipt of funds from an investor introduced by the Platform.".to_string()],
        ),
        (
            4,
            "Company Obligations",
            vec![format!(
                "The Company, acting through {}, warrants that all information provided to the Platform is true, complete and not misleading, and shall promptly notify the Platform of any material change.",
                p.founder
            )],
        ),
        (
            5,
            "Confidentiality",
            vec!["Each party shall keep confidential all non-public information received from the other party and use it solely for the purposes of this Agreement.".to_string()],
        ),
        (
            6,
            "Term and Termination",
            vec![
                format!(
                    "This Agreement shall remain in force for {} months from the date of execution unless terminated earlier.",
                    p.term
                ),
                "Either party may terminate this Agreement by giving thirty (30) days' written notice. Fees accrued up to the date of termination remain payable.".to_string(),
            ],
        ),
        (
            7,
            "Governing Law",
            vec![format!(
                "This Agreement is governed by the laws of India, and the courts at {} shall have exclusive jurisdiction.",
                p.jurisdiction
            )],
        ),
        (
            8,
            "Entire Agreement",
            vec!["This Agreement, together with its Schedules, constitutes the entire agreement between the parties and supersedes all prior understandings relating to its subject matter.".to_string()],
        ),
    ]
}

const FEE_PARTICULARS_X: f32 = 50.0;
const FEE_AMOUNT_X: f32 = 300.0;
const FEE_BASIS_X: f32 = 420.0;

fn fee_table(input: &EMandateInput) -> TableSpec {
    let amount = |value: &Option<String>| {
        value
            .as_deref()
            .map(|v| money(&sanitize(v)))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| AS_AGREED.to_string())
    };
    let success = input
        .success_fee_percent
        .as_deref()
        .map(sanitize)
        .map(|v| v.trim().trim_end_matches('%').to_string())
        .filter(|v| !v.is_empty())
        .map(|v| format!("{}%", v))
        .unwrap_or_else(|| AS_AGREED.to_string());
    TableSpec::new(vec![
        Column::new("Particulars", FEE_PARTICULARS_X),
        Column::new("Amount", FEE_AMOUNT_X),
        Column::new("Basis", FEE_BASIS_X),
    ])
    .row(vec![
        "Onboarding Fee".into(),
        amount(&input.onboarding_fee),
        "One-time".into(),
    ])
    .row(vec![
        "Success Fee".into(),
        success,
        "Of funds raised".into(),
    ])
    .row(vec![
        "Retainer".into(),
        amount(&input.retainer_fee),
        "Monthly".into(),
    ])
}

fn signature_asset(name: &str, payload: &Option<String>) -> Option<ImageAsset> {
    payload
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| ImageAsset::new(name, ImageSource::Data(p.to_string())))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
