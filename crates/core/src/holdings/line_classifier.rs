//! Line classification rules for statement text.
//!
//! Every line maps to exactly one [`LineKind`]. The rules are tried in table
//! order and the first match wins: Folio, Units, NAV, Invested, SchemeName,
//! ISIN, then Noise. Quantity rules only match when a number follows the label,
//! so a scheme called "Low Cost Fund" still reads as a scheme name.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    /// First numeric token: digits with optional `,` grouping and a fraction
    static ref NUMBER_REGEX: Regex =
        Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("Invalid regex pattern");

    /// `31-Mar-2024`, `31 March 2024`, `31/03/2024`, `2024-03-31`
    static ref DATE_REGEX: Regex = Regex::new(
        r"(?i)\b(?:\d{1,2}[-/ ](?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[-/ ]\d{2,4}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{4}-\d{2}-\d{2})\b"
    )
    .expect("Invalid regex pattern");

    /// `Folio No: 12345678/90`, `Folio 1234567`
    static ref FOLIO_LABEL_REGEX: Regex = Regex::new(
        r"(?i)\bfolio(?:\s*(?:no\.?|number|#))?\s*[:\-]?\s*(\d[0-9A-Za-z]*(?:\s*/\s*[0-9A-Za-z]+)?)"
    )
    .expect("Invalid regex pattern");

    /// Bare `digits/digits` folio token, not part of a date
    static ref BARE_FOLIO_REGEX: Regex =
        Regex::new(r"(?:^|[^\d/])(\d{6,12}\s*/\s*\d{1,4})(?:[^\d/]|$)")
            .expect("Invalid regex pattern");

    static ref UNITS_LABEL_REGEX: Regex =
        Regex::new(r"(?i)\b(?:units?|closing\s+(?:unit\s+)?balance)\b")
            .expect("Invalid regex pattern");

    static ref NAV_LABEL_REGEX: Regex =
        Regex::new(r"(?i)\bnav\b").expect("Invalid regex pattern");

    static ref INVESTED_LABEL_REGEX: Regex = Regex::new(
        r"(?i)\b(?:invested(?:\s+amount)?|amount\s+invested|(?:total\s+)?cost(?:\s+value)?|purchase\s+(?:value|cost))\b"
    )
    .expect("Invalid regex pattern");

    static ref SCHEME_KEYWORD_REGEX: Regex =
        Regex::new(r"(?i)\b(?:fund|scheme|etf|fof)\b").expect("Invalid regex pattern");

    static ref TOTAL_PREFIX_REGEX: Regex =
        Regex::new(r"(?i)^(?:grand\s+|sub\s*)?total\b").expect("Invalid regex pattern");

    /// ISIN shape: country prefix, nine alphanumerics, check digit
    static ref ISIN_TOKEN_REGEX: Regex =
        Regex::new(r"\b([A-Z]{2}[A-Z0-9]{9}[0-9])\b").expect("Invalid regex pattern");

    static ref ISIN_LINE_REGEX: Regex = Regex::new(
        r"(?i)^(?:isin\b\s*[:\-]?\s*)?([a-z]{2}[a-z0-9]{9}[0-9])$"
    )
    .expect("Invalid regex pattern");

    static ref ISIN_LABEL_REGEX: Regex = Regex::new(
        r"(?i)\bisin\b\s*[:\-]?\s*([a-z]{2}[a-z0-9]{9}[0-9])\b"
    )
    .expect("Invalid regex pattern");
}

/// Classification of one statement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Starts a new holding; carries the cleaned name and any ISIN printed with it.
    SchemeName { name: String, isin: Option<String> },
    Isin(String),
    Folio(String),
    Units(Decimal),
    Nav(Decimal),
    Invested(Decimal),
    Noise,
}

type Rule = fn(&str) -> Option<LineKind>;

const RULES: &[Rule] = &[
    folio_rule,
    units_rule,
    nav_rule,
    invested_rule,
    scheme_name_rule,
    isin_rule,
];

/// Classifies a single line. Total: anything unrecognised is `Noise`.
pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Noise;
    }
    RULES
        .iter()
        .find_map(|rule| rule(line))
        .unwrap_or(LineKind::Noise)
}

/// Parses the first numeric token in `text`.
///
/// Thousands separators and any currency glyph before the number are
/// tolerated; anything unparsable yields `None`.
pub fn parse_quantity(text: &str) -> Option<Decimal> {
    let token = NUMBER_REGEX.find(text)?.as_str();
    let digits: String = token.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&digits).ok()
}

/// First number after `label`, skipping an "as on" date between the two.
fn labeled_quantity(label: &Regex, line: &str) -> Option<Decimal> {
    let label_match = label.find(line)?;
    let rest = DATE_REGEX.replace_all(&line[label_match.end()..], " ");
    parse_quantity(&rest)
}

fn folio_rule(line: &str) -> Option<LineKind> {
    let captures = FOLIO_LABEL_REGEX
        .captures(line)
        .or_else(|| BARE_FOLIO_REGEX.captures(line))?;
    let folio: String = captures[1].split_whitespace().collect();
    Some(LineKind::Folio(folio))
}

fn units_rule(line: &str) -> Option<LineKind> {
    labeled_quantity(&UNITS_LABEL_REGEX, line).map(LineKind::Units)
}

fn nav_rule(line: &str) -> Option<LineKind> {
    labeled_quantity(&NAV_LABEL_REGEX, line).map(LineKind::Nav)
}

fn invested_rule(line: &str) -> Option<LineKind> {
    labeled_quantity(&INVESTED_LABEL_REGEX, line).map(LineKind::Invested)
}

fn scheme_name_rule(line: &str) -> Option<LineKind> {
    if !SCHEME_KEYWORD_REGEX.is_match(line) || TOTAL_PREFIX_REGEX.is_match(line) {
        return None;
    }

    let isin = ISIN_TOKEN_REGEX
        .captures_iter(line)
        .map(|c| c[1].to_string())
        .find(|token| looks_like_isin(token));

    let without_isin = match &isin {
        Some(code) => line.replace(code.as_str(), " "),
        None => line.to_string(),
    };
    let name = clean_scheme_name(&without_isin);
    if name.is_empty() {
        return None;
    }

    Some(LineKind::SchemeName { name, isin })
}

fn isin_rule(line: &str) -> Option<LineKind> {
    let captures = ISIN_LINE_REGEX
        .captures(line)
        .or_else(|| ISIN_LABEL_REGEX.captures(line))?;
    let code = captures[1].to_ascii_uppercase();
    looks_like_isin(&code).then_some(LineKind::Isin(code))
}

/// Rejects all-letter words that merely have the ISIN length.
fn looks_like_isin(token: &str) -> bool {
    token.len() == 12 && token[2..11].chars().any(|c| c.is_ascii_digit())
}

/// Collapse whitespace and trim separators and a dangling "ISIN" label
fn clean_scheme_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| matches!(c, '-' | ':' | '|' | ',' | ' '));
    let without_label = trimmed
        .strip_suffix("ISIN")
        .or_else(|| trimmed.strip_suffix("isin"))
        .unwrap_or(trimmed);
    without_label
        .trim_matches(|c: char| matches!(c, '-' | ':' | '|' | ',' | ' ' | '('))
        .to_string()
}
