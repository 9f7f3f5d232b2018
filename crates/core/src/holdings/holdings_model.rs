//! Holding domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// Coarse asset category derived from a scheme name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Equity,
    Debt,
    Hybrid,
    Liquid,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Equity => "EQUITY",
            Category::Debt => "DEBT",
            Category::Hybrid => "HYBRID",
            Category::Liquid => "LIQUID",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUITY" => Ok(Category::Equity),
            "DEBT" => Ok(Category::Debt),
            "HYBRID" => Ok(Category::Hybrid),
            "LIQUID" => Ok(Category::Liquid),
            "OTHER" => Ok(Category::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown holding category '{}'",
                other
            )))),
        }
    }
}

/// One line item recovered from a statement, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateHolding {
    pub scheme_name: String,
    pub scheme_code: String,
    pub folio_number: Option<String>,
    pub units: Decimal,
    pub current_nav: Decimal,
    pub invested_amount: Decimal,
    /// `units * current_nav`
    pub current_value: Decimal,
    /// `current_value - invested_amount`
    pub returns: Decimal,
    /// `returns / invested_amount * 100`, or zero when nothing was invested
    pub returns_percentage: Decimal,
    pub category: Category,
}

impl CandidateHolding {
    /// Builds a candidate and computes its derived fields.
    ///
    /// Returns `None` when a derived value does not fit in a `Decimal`.
    pub fn new(
        scheme_name: impl Into<String>,
        scheme_code: impl Into<String>,
        folio_number: Option<String>,
        units: Decimal,
        current_nav: Decimal,
        invested_amount: Decimal,
        category: Category,
    ) -> Option<Self> {
        let current_value = units.checked_mul(current_nav)?;
        let returns = current_value.checked_sub(invested_amount)?;
        let returns_percentage = if invested_amount > Decimal::ZERO {
            returns
                .checked_div(invested_amount)?
                .checked_mul(Decimal::ONE_HUNDRED)?
        } else {
            Decimal::ZERO
        };

        Some(Self {
            scheme_name: scheme_name.into(),
            scheme_code: scheme_code.into(),
            folio_number,
            units,
            current_nav,
            invested_amount,
            current_value,
            returns,
            returns_percentage,
            category,
        })
    }

    /// Row-level checks applied before a candidate is persisted.
    pub fn validate(&self) -> std::result::Result<(), RejectionReason> {
        if self.scheme_name.trim().is_empty() {
            return Err(RejectionReason::MissingSchemeName);
        }
        if self.scheme_code.trim().is_empty() {
            return Err(RejectionReason::MissingSchemeCode);
        }
        if self.units <= Decimal::ZERO {
            return Err(RejectionReason::NonPositiveUnits);
        }
        if self.current_nav.is_sign_negative() {
            return Err(RejectionReason::NegativeNav);
        }
        if self.invested_amount.is_sign_negative() {
            return Err(RejectionReason::NegativeInvestedAmount);
        }
        Ok(())
    }
}

/// Why a candidate was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    MissingSchemeName,
    MissingSchemeCode,
    NonPositiveUnits,
    NegativeNav,
    NegativeInvestedAmount,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectionReason::MissingSchemeName => "scheme name is empty",
            RejectionReason::MissingSchemeCode => "scheme code is empty",
            RejectionReason::NonPositiveUnits => "units must be greater than zero",
            RejectionReason::NegativeNav => "NAV cannot be negative",
            RejectionReason::NegativeInvestedAmount => "invested amount cannot be negative",
        };
        f.write_str(message)
    }
}

/// Composite identity of a persisted holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingKey {
    pub owner_id: String,
    pub scheme_code: String,
    pub folio_number: Option<String>,
}

/// Domain model representing a persisted holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub owner_id: String,
    pub scheme_code: String,
    pub scheme_name: String,
    pub folio_number: Option<String>,
    pub units: Decimal,
    pub current_nav: Decimal,
    pub invested_amount: Decimal,
    pub current_value: Decimal,
    pub returns: Decimal,
    pub returns_percentage: Decimal,
    pub category: Category,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Holding {
    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            owner_id: self.owner_id.clone(),
            scheme_code: self.scheme_code.clone(),
            folio_number: self.folio_number.clone(),
        }
    }
}

/// Input model for inserting or updating a holding by its composite key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingUpsert {
    pub owner_id: String,
    pub scheme_code: String,
    pub scheme_name: String,
    pub folio_number: Option<String>,
    pub units: Decimal,
    pub current_nav: Decimal,
    pub invested_amount: Decimal,
    pub current_value: Decimal,
    pub returns: Decimal,
    pub returns_percentage: Decimal,
    pub category: Category,
}

impl HoldingUpsert {
    pub fn from_candidate(owner_id: &str, candidate: CandidateHolding) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            scheme_code: candidate.scheme_code,
            scheme_name: candidate.scheme_name,
            folio_number: candidate.folio_number,
            units: candidate.units,
            current_nav: candidate.current_nav,
            invested_amount: candidate.invested_amount,
            current_value: candidate.current_value,
            returns: candidate.returns,
            returns_percentage: candidate.returns_percentage,
            category: candidate.category,
        }
    }

    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            owner_id: self.owner_id.clone(),
            scheme_code: self.scheme_code.clone(),
            folio_number: self.folio_number.clone(),
        }
    }
}
