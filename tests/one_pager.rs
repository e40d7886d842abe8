mod common;

use common::{image_draws, page_count, png_base64, text_runs};
use dealpress::one_pager::{ImageDescriptor, PeerAnalysis};
use dealpress::{DealPress, ImageFetcher, OnePagerInput};
use std::sync::Arc;

fn peer_input() -> OnePagerInput {
    serde_json::from_str(
        r#"{
            "companyName": "Acme Pvt Ltd",
            "fundingType": "equity",
            "fundingPurpose": "working_capital",
            "fundraiseAmount": 50000000,
            "peerAnalysis": { "companyNames": ["PeerCo"], "revenue": ["100"] }
        }"#,
    )
    .unwrap()
}

#[test]
fn peer_row_lands_on_fixed_offsets_with_na_gaps() {
    let bytes = dealpress::generate_one_pager(&peer_input()).unwrap();
    let runs = text_runs(&bytes);
    let peer = runs.iter().find(|r| r.text == "PeerCo").expect("peer row");
    assert_eq!(peer.x, 50.0);

    let row: Vec<(f32, &str)> = runs
        .iter()
        .filter(|r| r.page == peer.page && r.y == peer.y)
        .map(|r| (r.x, r.text.as_str()))
        .collect();
    assert_eq!(
        row,
        vec![
            (50.0, "PeerCo"),
            (170.0, "100"),
            (270.0, "N/A"),
            (370.0, "N/A"),
            (470.0, "N/A"),
        ]
    );
}

#[test]
fn header_uses_display_labels() {
    let bytes = dealpress::generate_one_pager(&peer_input()).unwrap();
    let runs = text_runs(&bytes);
    for expected in ["Equity", "Working Capital", "Rs. 50000000", "ACME PVT LTD"] {
        assert!(
            runs.iter().any(|r| r.page == 1 && r.text == expected),
            "missing {expected}"
        );
    }
}

#[test]
fn title_with_micro_sign_still_renders() {
    let input = OnePagerInput {
        company_name: Some("µSense Labs".into()),
        ..OnePagerInput::default()
    };
    let bytes = dealpress::generate_one_pager(&input).unwrap();
    let runs = text_runs(&bytes);
    // 0xB5 is the WinAnsi micro sign, which is not valid UTF-8 on its own.
    assert!(
        runs.iter()
            .any(|r| r.page == 1 && r.text == "\u{FFFD}SENSE LABS")
    );
}

#[test]
fn long_peer_names_are_cut_to_fifteen_chars() {
    let input = OnePagerInput {
        peer_analysis: Some(PeerAnalysis {
            company_names: vec![Some("Consolidated Widgets Limited".into())],
            ..PeerAnalysis::default()
        }),
        ..OnePagerInput::default()
    };
    let runs = text_runs(&dealpress::generate_one_pager(&input).unwrap());
    assert!(runs.iter().any(|r| r.text == "Consolidated Wi" && r.x == 50.0));
}

#[test]
fn financial_highlights_use_year_columns() {
    let input: OnePagerInput = serde_json::from_str(
        r#"{"financialHighlights":{"years":["FY23","FY24"],"revenue":[120,"150"],"netWorth":["₹40 cr"]}}"#,
    )
    .unwrap();
    let runs = text_runs(&dealpress::generate_one_pager(&input).unwrap());
    let fy24 = runs.iter().find(|r| r.text == "FY24").unwrap();
    assert_eq!(fy24.x, 290.0);
    let revenue = runs.iter().find(|r| r.text == "Revenue" && r.x == 50.0).unwrap();
    let row: Vec<&str> = runs
        .iter()
        .filter(|r| r.y == revenue.y && r.page == revenue.page)
        .map(|r| r.text.as_str())
        .collect();
    assert_eq!(row, vec!["Revenue", "120", "150"]);
    assert!(runs.iter().any(|r| r.text == "Rs. 40 cr" && r.x == 200.0));
}

#[test]
fn missing_everything_still_renders() {
    let bytes = dealpress::generate_one_pager(&OnePagerInput::default()).unwrap();
    let runs = text_runs(&bytes);
    assert!(runs.iter().any(|r| r.text == "COMPANY"));
    assert!(runs.iter().any(|r| r.text == "Not specified"));
    assert!(runs.iter().any(|r| r.text == "Peer analysis not provided."));
}

#[test]
fn corrupt_and_unreachable_images_become_placeholders() {
    let input = OnePagerInput {
        images: vec![
            ImageDescriptor {
                data: Some("definitely not an image".into()),
                original_name: Some("dashboard.png".into()),
                ..ImageDescriptor::default()
            },
            ImageDescriptor {
                url: Some("https://cdn.example.com/app.jpg".into()),
                original_name: Some("app.jpg".into()),
                ..ImageDescriptor::default()
            },
            ImageDescriptor {
                path: Some("/nonexistent/dir/photo.png".into()),
                ..ImageDescriptor::default()
            },
        ],
        ..peer_input()
    };
    let (bytes, metrics) = DealPress::builder()
        .build()
        .unwrap()
        .generate_one_pager_with_metrics(&input)
        .unwrap();
    assert_eq!(metrics.image_fallbacks, 3);
    let runs = text_runs(&bytes);
    for expected in ["[Image: dashboard.png]", "[Image: app.jpg]", "[Image: Image 3]"] {
        assert!(runs.iter().any(|r| r.text == expected), "missing {expected}");
    }
}

struct ServeFixture(Vec<u8>);

impl ImageFetcher for ServeFixture {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        if url.ends_with("/product.png") {
            Ok(self.0.clone())
        } else {
            Err(format!("404 for {url}"))
        }
    }
}

#[test]
fn fetched_product_image_is_scaled_into_its_box() {
    use base64::Engine;
    let png = base64::engine::general_purpose::STANDARD
        .decode(png_base64(500, 200))
        .unwrap();
    let press = DealPress::builder()
        .image_fetcher(Arc::new(ServeFixture(png)))
        .build()
        .unwrap();
    let input = OnePagerInput {
        images: vec![ImageDescriptor {
            url: Some("https://cdn.example.com/product.png".into()),
            original_name: Some("product.png".into()),
            ..ImageDescriptor::default()
        }],
        ..peer_input()
    };
    let (bytes, metrics) = press.generate_one_pager_with_metrics(&input).unwrap();
    assert_eq!(metrics.images_embedded, 1);
    assert_eq!(metrics.image_fallbacks, 0);
    assert_eq!(metrics.page_count, page_count(&bytes));
    let draws = image_draws(&bytes);
    assert_eq!(draws.len(), 1);
    // 500x200 into 250x180 scales by 0.5.
    assert_eq!(draws[0].height, 100.0);
    assert!(draws[0].y >= 50.0);
}
