//! Database model for holdings.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use casfolio_core::holdings::{Category, Holding, HoldingUpsert};

use crate::errors::StorageError;

/// Database model for holdings.
///
/// Decimals are stored as text to keep full precision. A missing folio is
/// stored as `""` so the composite unique index covers it.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub owner_id: String,
    pub scheme_code: String,
    pub scheme_name: String,
    pub folio_number: String,
    pub units: String,
    pub current_nav: String,
    pub invested_amount: String,
    pub current_value: String,
    pub returns: String,
    pub returns_percentage: String,
    pub category: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub(crate) fn folio_to_db(folio: Option<&str>) -> String {
    folio.unwrap_or_default().to_string()
}

fn folio_from_db(folio: String) -> Option<String> {
    if folio.is_empty() {
        None
    } else {
        Some(folio)
    }
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::Decode(format!("{} '{}': {}", field, value, e)))
}

impl HoldingDB {
    /// Row for a first insert; `id` and timestamps are only kept if the key is new.
    pub fn from_upsert(upsert: &HoldingUpsert, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: upsert.owner_id.clone(),
            scheme_code: upsert.scheme_code.clone(),
            scheme_name: upsert.scheme_name.clone(),
            folio_number: folio_to_db(upsert.folio_number.as_deref()),
            units: upsert.units.to_string(),
            current_nav: upsert.current_nav.to_string(),
            invested_amount: upsert.invested_amount.to_string(),
            current_value: upsert.current_value.to_string(),
            returns: upsert.returns.to_string(),
            returns_percentage: upsert.returns_percentage.to_string(),
            category: upsert.category.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<HoldingDB> for Holding {
    type Error = StorageError;

    fn try_from(db: HoldingDB) -> Result<Self, Self::Error> {
        let category = Category::from_str(&db.category).unwrap_or_else(|_| {
            log::warn!("Unknown category on holding {}, using OTHER", db.id);
            Category::Other
        });

        Ok(Self {
            units: parse_decimal(&db.units, "units")?,
            current_nav: parse_decimal(&db.current_nav, "current_nav")?,
            invested_amount: parse_decimal(&db.invested_amount, "invested_amount")?,
            current_value: parse_decimal(&db.current_value, "current_value")?,
            returns: parse_decimal(&db.returns, "returns")?,
            returns_percentage: parse_decimal(&db.returns_percentage, "returns_percentage")?,
            category,
            folio_number: folio_from_db(db.folio_number),
            id: db.id,
            owner_id: db.owner_id,
            scheme_code: db.scheme_code,
            scheme_name: db.scheme_name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn upsert(folio: Option<&str>) -> HoldingUpsert {
        HoldingUpsert {
            owner_id: "user-1".to_string(),
            scheme_code: "INF109K01Z48".to_string(),
            scheme_name: "Bluechip Fund".to_string(),
            folio_number: folio.map(str::to_string),
            units: dec!(12.345),
            current_nav: dec!(80.10),
            invested_amount: dec!(900),
            current_value: dec!(988.83345),
            returns: dec!(88.83345),
            returns_percentage: dec!(9.87038333),
            category: Category::Equity,
        }
    }

    #[test]
    fn test_round_trip_keeps_decimal_precision() {
        let now = chrono::Utc::now().naive_utc();
        let db = HoldingDB::from_upsert(&upsert(Some("123456/7")), now);
        assert_eq!(db.units, "12.345");
        assert_eq!(db.category, "EQUITY");

        let holding = Holding::try_from(db).unwrap();
        assert_eq!(holding.current_value, dec!(988.83345));
        assert_eq!(holding.folio_number.as_deref(), Some("123456/7"));
    }

    #[test]
    fn test_missing_folio_is_stored_as_empty_string() {
        let now = chrono::Utc::now().naive_utc();
        let db = HoldingDB::from_upsert(&upsert(None), now);
        assert_eq!(db.folio_number, "");
        assert_eq!(Holding::try_from(db).unwrap().folio_number, None);
    }

    #[test]
    fn test_corrupt_decimal_is_a_decode_error() {
        let now = chrono::Utc::now().naive_utc();
        let mut db = HoldingDB::from_upsert(&upsert(None), now);
        db.units = "twelve".to_string();
        assert!(matches!(Holding::try_from(db), Err(StorageError::Decode(_))));
    }
}
