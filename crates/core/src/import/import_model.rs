//! Import request and result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::documents::{Credential, RawDocument};
use crate::holdings::{Holding, RejectionReason};

/// One statement upload to run through the pipeline.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub document: RawDocument,
    pub credential: Credential,
    /// Identity the caller authenticated; the pipeline trusts it as given.
    pub owner_id: Option<String>,
}

impl ImportRequest {
    pub fn new(
        document: RawDocument,
        credential: impl Into<Credential>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            document,
            credential: credential.into(),
            owner_id,
        }
    }
}

/// Counts for one reconciled batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub total_candidates: usize,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportOutcome {
    #[serde(rename_all = "camelCase")]
    Accepted { holding_id: String },
    Rejected { reason: RejectionReason },
}

impl ImportOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ImportOutcome::Accepted { .. })
    }
}

/// Per-candidate detail, in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    pub index: usize,
    pub scheme_code: String,
    pub folio_number: Option<String>,
    pub outcome: ImportOutcome,
}

/// Reconciler result: the tallies plus the rows they were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub summary: ImportSummary,
    pub outcomes: Vec<RowOutcome>,
}

impl Reconciliation {
    pub(crate) fn record(&mut self, row: RowOutcome) {
        self.summary.total_candidates += 1;
        if row.outcome.is_accepted() {
            self.summary.accepted_count += 1;
        } else {
            self.summary.rejected_count += 1;
        }
        self.outcomes.push(row);
    }

    /// Scheme codes of the accepted rows, first occurrence order, no repeats.
    pub fn accepted_scheme_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for row in self.outcomes.iter().filter(|r| r.outcome.is_accepted()) {
            if !codes.contains(&row.scheme_code) {
                codes.push(row.scheme_code.clone());
            }
        }
        codes
    }
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub outcomes: Vec<RowOutcome>,
    /// The owner's holdings after the import, for display refresh.
    pub holdings: Vec<Holding>,
    /// Aggregates over `holdings`.
    pub totals: PortfolioTotals,
}

/// Portfolio-level sums over an owner's holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_current_value: Decimal,
    pub total_invested: Decimal,
    /// `total_current_value - total_invested`
    pub total_returns: Decimal,
    /// `total_returns / total_invested * 100`, or zero when nothing was invested
    pub total_returns_percentage: Decimal,
}

impl PortfolioTotals {
    /// Sums saturate at the `Decimal` range instead of failing the import.
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let (total_current_value, total_invested) = holdings.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(value, invested), holding| {
                (
                    value.saturating_add(holding.current_value),
                    invested.saturating_add(holding.invested_amount),
                )
            },
        );
        let total_returns = total_current_value.saturating_sub(total_invested);
        let total_returns_percentage = if total_invested > Decimal::ZERO {
            total_returns
                .checked_div(total_invested)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        Self {
            total_current_value,
            total_invested,
            total_returns,
            total_returns_percentage,
        }
    }
}
