//! Property-based tests for statement extraction.
//!
//! Statements are rendered from generated holding blocks, then fed back
//! through the extractor to check the derived-value invariants and that
//! nothing in the text layer can make extraction panic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use casfolio_core::documents::ExtractedText;
use casfolio_core::holdings::{classify_line, extract, parse_quantity, synthesize_scheme_code};

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
struct Block {
    name: String,
    folio: Option<String>,
    units: Decimal,
    nav: Decimal,
    invested: Option<Decimal>,
}

fn arb_scheme_name() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["Alpha", "Bharat", "Kotak", "Nippon", "Quant", "Zenith"]),
        prop::sample::select(vec!["Equity", "Bond", "Hybrid", "Liquid", "Gold", "Flexi Cap"]),
        prop::sample::select(vec!["Fund", "Fund - Growth", "Fund Direct Plan"]),
    )
        .prop_map(|(house, kind, suffix)| format!("{} {} {}", house, kind, suffix))
}

/// Positive decimal with up to four fractional digits.
fn arb_positive_decimal(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..max, 0u32..5).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn arb_block() -> impl Strategy<Value = Block> {
    (
        arb_scheme_name(),
        proptest::option::of((100_000u32..99_999_999, 1u32..99)),
        arb_positive_decimal(100_000_000),
        arb_positive_decimal(10_000_000),
        proptest::option::of(prop_oneof![
            Just(Decimal::ZERO),
            arb_positive_decimal(1_000_000_000)
        ]),
    )
        .prop_map(|(name, folio, units, nav, invested)| Block {
            name,
            folio: folio.map(|(account, check)| format!("{}/{}", account, check)),
            units,
            nav,
            invested,
        })
}

fn arb_noise_line() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Consolidated Account Statement".to_string(),
        "Page 2 of 7".to_string(),
        "Registrar: KFin Technologies".to_string(),
        "Statement period 01-Apr-2024 to 31-Mar-2025".to_string(),
        "----------------------------------------".to_string(),
    ])
}

/// Formats with Indian-style thousands grouping on the integer part.
fn grouped(value: Decimal) -> String {
    let text = value.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::new();
    let len = digits.len();
    for (i, c) in digits.iter().enumerate() {
        out.push(*c);
        let remaining = len - i - 1;
        if remaining > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            out.push(',');
        }
    }
    match frac_part {
        Some(f) => format!("{}.{}", out, f),
        None => out,
    }
}

fn render(blocks: &[Block], noise: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if let Some(line) = noise.get(i) {
            lines.push(line.clone());
        }
        lines.push(block.name.clone());
        if let Some(folio) = &block.folio {
            lines.push(format!("Folio No: {}", folio));
        }
        lines.push(format!("Closing Unit Balance: {}", grouped(block.units)));
        lines.push(format!("NAV: ₹ {}", grouped(block.nav)));
        if let Some(invested) = block.invested {
            lines.push(format!("Invested Amount: Rs. {}", grouped(invested)));
        }
    }
    lines
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_every_block_yields_one_consistent_candidate(
        blocks in prop::collection::vec(arb_block(), 1..8),
        noise in prop::collection::vec(arb_noise_line(), 0..8),
    ) {
        let text = ExtractedText::from_pages(vec![render(&blocks, &noise).join("\n")]);
        let candidates: Vec<_> = extract(text).collect();

        prop_assert_eq!(candidates.len(), blocks.len());
        for (candidate, block) in candidates.iter().zip(blocks.iter()) {
            prop_assert_eq!(&candidate.scheme_name, &block.name);
            prop_assert_eq!(&candidate.folio_number, &block.folio);
            prop_assert_eq!(candidate.units, block.units);
            prop_assert_eq!(candidate.current_nav, block.nav);
            prop_assert_eq!(candidate.invested_amount, block.invested.unwrap_or(Decimal::ZERO));
            prop_assert_eq!(candidate.current_value, candidate.units * candidate.current_nav);
            prop_assert_eq!(candidate.returns, candidate.current_value - candidate.invested_amount);
            if candidate.invested_amount == Decimal::ZERO {
                prop_assert_eq!(candidate.returns_percentage, Decimal::ZERO);
            }
            prop_assert_eq!(&candidate.scheme_code, &synthesize_scheme_code(&block.name));
        }
    }

    #[test]
    fn prop_grouped_numbers_parse_back(value in arb_positive_decimal(i64::MAX / 4)) {
        prop_assert_eq!(parse_quantity(&format!("₹ {}", grouped(value))), Some(value));
    }

    #[test]
    fn prop_classification_and_extraction_never_panic(
        lines in prop::collection::vec(any::<String>(), 0..40),
    ) {
        for line in &lines {
            let _ = classify_line(line);
        }
        let text = ExtractedText::from_pages(vec![lines.join("\n")]);
        for candidate in extract(text) {
            prop_assert!(candidate.units >= Decimal::ZERO);
            prop_assert_eq!(candidate.current_value, candidate.units * candidate.current_nav);
        }
    }

    #[test]
    fn prop_scheme_code_ignores_case_and_spacing(name in arb_scheme_name()) {
        let shouted = name.to_uppercase();
        let spaced = format!("  {}  ", name.replace(' ', "   "));
        let code = synthesize_scheme_code(&name);
        prop_assert_eq!(&code, &synthesize_scheme_code(&shouted));
        prop_assert_eq!(&code, &synthesize_scheme_code(&spaced));
        prop_assert!(code.starts_with("SYN-"));
    }
}
