//! Streaming holding extraction over statement lines.

use std::iter::FusedIterator;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::category::classify;
use super::holdings_model::CandidateHolding;
use super::line_classifier::{classify_line, LineKind};
use super::scheme_code::synthesize_scheme_code;
use crate::documents::ExtractedText;

/// Fields collected since the last scheme-name line.
#[derive(Debug, Default)]
struct Draft {
    scheme_name: String,
    isin: Option<String>,
    folio_number: Option<String>,
    units: Option<Decimal>,
    current_nav: Option<Decimal>,
    invested_amount: Option<Decimal>,
}

impl Draft {
    fn start(scheme_name: String, isin: Option<String>) -> Self {
        Self {
            scheme_name,
            isin,
            ..Default::default()
        }
    }

    /// Later lines overwrite earlier ones within the same draft.
    fn absorb(&mut self, kind: LineKind) {
        match kind {
            LineKind::Isin(code) => self.isin = Some(code),
            LineKind::Folio(folio) => self.folio_number = Some(folio),
            LineKind::Units(units) => self.units = Some(units),
            LineKind::Nav(nav) => self.current_nav = Some(nav),
            LineKind::Invested(amount) => self.invested_amount = Some(amount),
            LineKind::SchemeName { .. } | LineKind::Noise => {}
        }
    }

    /// Emits a candidate only when both units and NAV were seen.
    fn finalize(self) -> Option<CandidateHolding> {
        let (units, current_nav) = match (self.units, self.current_nav) {
            (Some(units), Some(nav)) => (units, nav),
            _ => {
                debug!("Discarding incomplete holding block without units or NAV");
                return None;
            }
        };

        let scheme_code = self
            .isin
            .unwrap_or_else(|| synthesize_scheme_code(&self.scheme_name));
        let category = classify(&self.scheme_name);

        let candidate = CandidateHolding::new(
            self.scheme_name,
            scheme_code,
            self.folio_number,
            units,
            current_nav,
            self.invested_amount.unwrap_or(Decimal::ZERO),
            category,
        );
        if candidate.is_none() {
            warn!("Discarding holding block whose computed value overflows");
        }
        candidate
    }
}

/// Lazily turns a stream of lines into candidate holdings.
///
/// Lines before the first scheme name are ignored. Each scheme name closes the
/// previous block; the final block is closed when the lines run out. The
/// iterator is single pass and yields candidates in statement order.
pub struct HoldingExtractor<I> {
    lines: I,
    draft: Option<Draft>,
    finished: bool,
}

impl<I> HoldingExtractor<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            draft: None,
            finished: false,
        }
    }
}

impl<I> Iterator for HoldingExtractor<I>
where
    I: Iterator<Item = String>,
{
    type Item = CandidateHolding;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some(line) = self.lines.next() {
            match classify_line(&line) {
                LineKind::SchemeName { name, isin } => {
                    let previous = self.draft.replace(Draft::start(name, isin));
                    if let Some(candidate) = previous.and_then(Draft::finalize) {
                        return Some(candidate);
                    }
                }
                kind => {
                    if let Some(draft) = self.draft.as_mut() {
                        draft.absorb(kind);
                    }
                }
            }
        }

        self.finished = true;
        self.draft.take().and_then(Draft::finalize)
    }
}

impl<I> FusedIterator for HoldingExtractor<I> where I: Iterator<Item = String> {}

/// Extracts candidates from decrypted statement text.
pub fn extract(text: ExtractedText) -> HoldingExtractor<std::vec::IntoIter<String>> {
    HoldingExtractor::new(text.into_iter())
}
