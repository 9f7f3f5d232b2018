use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use casfolio_core::errors::{Error, Result};
use casfolio_core::holdings::{Holding, HoldingRepositoryTrait, HoldingUpsert};

use super::model::HoldingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::holdings;
use crate::schema::holdings::dsl::*;

/// Repository for holdings in SQLite.
pub struct HoldingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HoldingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl HoldingRepositoryTrait for HoldingRepository {
    /// Single `INSERT .. ON CONFLICT DO UPDATE` on the composite key, then reads
    /// the stored row back inside the same write transaction.
    async fn upsert(&self, upsert: HoldingUpsert) -> Result<Holding> {
        let row = HoldingDB::from_upsert(&upsert, Utc::now().naive_utc());

        self.writer
            .exec(move |conn| {
                diesel::insert_into(holdings::table)
                    .values(&row)
                    .on_conflict((owner_id, scheme_code, folio_number))
                    .do_update()
                    .set((
                        scheme_name.eq(&row.scheme_name),
                        units.eq(&row.units),
                        current_nav.eq(&row.current_nav),
                        invested_amount.eq(&row.invested_amount),
                        current_value.eq(&row.current_value),
                        returns.eq(&row.returns),
                        returns_percentage.eq(&row.returns_percentage),
                        category.eq(&row.category),
                        updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)
                    .into_core()?;

                let stored = holdings
                    .filter(owner_id.eq(&row.owner_id))
                    .filter(scheme_code.eq(&row.scheme_code))
                    .filter(folio_number.eq(&row.folio_number))
                    .select(HoldingDB::as_select())
                    .first::<HoldingDB>(conn)
                    .into_core()?;

                if stored.id != row.id {
                    debug!("Updated existing holding {}", stored.id);
                }
                Holding::try_from(stored).map_err(Error::from)
            })
            .await
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = holdings
            .filter(owner_id.eq(owner))
            .select(HoldingDB::as_select())
            .order((scheme_name.asc(), folio_number.asc()))
            .load::<HoldingDB>(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|row| Holding::try_from(row).map_err(Error::from))
            .collect()
    }

    async fn delete(&self, owner: &str, holding_id: &str) -> Result<usize> {
        let owner = owner.to_string();
        let holding_id = holding_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(holdings.filter(id.eq(holding_id)).filter(owner_id.eq(owner)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use casfolio_core::holdings::Category;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn create_test_repository() -> (HoldingRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (HoldingRepository::new(pool, writer), temp_dir)
    }

    fn upsert(owner: &str, code: &str, folio: Option<&str>, qty: Decimal) -> HoldingUpsert {
        let nav = dec!(10);
        let invested = dec!(100);
        let value = qty * nav;
        HoldingUpsert {
            owner_id: owner.to_string(),
            scheme_code: code.to_string(),
            scheme_name: format!("{} Equity Fund", code),
            folio_number: folio.map(str::to_string),
            units: qty,
            current_nav: nav,
            invested_amount: invested,
            current_value: value,
            returns: value - invested,
            returns_percentage: (value - invested) / invested * dec!(100),
            category: Category::Equity,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() {
        let (repo, _temp_dir) = create_test_repository();

        let first = repo
            .upsert(upsert("user-1", "AAA", Some("111111/1"), dec!(10)))
            .await
            .unwrap();
        let second = repo
            .upsert(upsert("user-1", "AAA", Some("111111/1"), dec!(25.5)))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.units, dec!(25.5));
        assert_eq!(second.current_value, dec!(255.0));
        assert_eq!(repo.list_by_owner("user-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_folio_less_holdings_are_deduplicated() {
        let (repo, _temp_dir) = create_test_repository();

        repo.upsert(upsert("user-1", "AAA", None, dec!(1))).await.unwrap();
        repo.upsert(upsert("user-1", "AAA", None, dec!(2))).await.unwrap();

        let listed = repo.list_by_owner("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].folio_number, None);
        assert_eq!(listed[0].units, dec!(2));
    }

    #[tokio::test]
    async fn test_key_components_are_independent() {
        let (repo, _temp_dir) = create_test_repository();

        repo.upsert(upsert("user-1", "AAA", Some("1/1"), dec!(1))).await.unwrap();
        repo.upsert(upsert("user-1", "AAA", Some("2/2"), dec!(1))).await.unwrap();
        repo.upsert(upsert("user-1", "BBB", Some("1/1"), dec!(1))).await.unwrap();
        repo.upsert(upsert("user-2", "AAA", Some("1/1"), dec!(1))).await.unwrap();

        let user_one = repo.list_by_owner("user-1").unwrap();
        assert_eq!(user_one.len(), 3);
        assert_eq!(user_one[0].scheme_name, "AAA Equity Fund");
        assert_eq!(repo.list_by_owner("user-2").unwrap().len(), 1);
        assert!(repo.list_by_owner("nobody").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_to_one_key_leave_one_row() {
        let (repo, _temp_dir) = create_test_repository();
        let repo = Arc::new(repo);

        let mut tasks = Vec::new();
        for i in 1..=8 {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                repo.upsert(upsert("user-1", "AAA", Some("1/1"), Decimal::from(i)))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let listed = repo.list_by_owner("user-1").unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let (repo, _temp_dir) = create_test_repository();
        let holding = repo
            .upsert(upsert("user-1", "AAA", None, dec!(1)))
            .await
            .unwrap();

        assert_eq!(repo.delete("user-2", &holding.id).await.unwrap(), 0);
        assert_eq!(repo.list_by_owner("user-1").unwrap().len(), 1);

        assert_eq!(repo.delete("user-1", &holding.id).await.unwrap(), 1);
        assert!(repo.list_by_owner("user-1").unwrap().is_empty());
    }
}
