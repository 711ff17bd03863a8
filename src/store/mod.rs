//! Translation record store: page queries and the draft/finalize state transitions.

pub mod query;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};

use crate::db::entities::translation;
use crate::error::{Result, ServerError};

pub use query::{ColumnFilters, FilterColumn, Page, PageRequest, QueryMode, TranslationRow};

/// Timestamps are stored as SQLite's own `YYYY-MM-DD HH:MM:SS` text
const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

#[derive(Clone)]
pub struct TranslationStore {
    db: DatabaseConnection,
}

impl TranslationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load one page of rows matching `mode`
    pub async fn page(&self, request: &PageRequest, mode: &QueryMode) -> Result<Page> {
        Ok(query::fetch_page(&self.db, request, mode).await?)
    }

    /// Overwrite the draft of an untranslated row.
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadyFinalized` when the
    /// row has been finalized; neither case writes anything.
    pub async fn update_draft(&self, id: i32, text: &str) -> Result<()> {
        let result = translation::Entity::update_many()
            .col_expr(translation::Column::TempHungarian, Expr::value(text.to_string()))
            .col_expr(translation::Column::ModifiedAt, Expr::cust(CURRENT_TIMESTAMP))
            .filter(translation::Column::Id.eq(id))
            .filter(translation::Column::IsTranslated.eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return match self.get(id).await? {
                None => Err(ServerError::NotFound(id)),
                Some(_) => Err(ServerError::AlreadyFinalized(id)),
            };
        }

        tracing::debug!("Updated draft for translation {}", id);
        Ok(())
    }

    /// Promote drafts to final translations in a single transaction.
    ///
    /// Rows that are already translated, and ids that do not exist, are
    /// skipped. Returns how many rows changed state.
    pub async fn finalize(&self, ids: &[i32]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;

        let finalized = match finalize_rows(&txn, ids).await {
            Ok(count) => count,
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        };
        txn.commit().await?;

        tracing::info!("Finalized {} of {} requested translations", finalized, ids.len());
        Ok(finalized)
    }

    pub async fn get(&self, id: i32) -> Result<Option<translation::Model>> {
        Ok(translation::Entity::find_by_id(id).one(&self.db).await?)
    }
}

async fn finalize_rows(
    txn: &DatabaseTransaction,
    ids: &[i32],
) -> std::result::Result<u64, DbErr> {
    let mut finalized = 0;
    for id in ids {
        let result = translation::Entity::update_many()
            .col_expr(
                translation::Column::FinalHungarian,
                Expr::col(translation::Column::TempHungarian).into(),
            )
            .col_expr(translation::Column::IsTranslated, Expr::value(true))
            .col_expr(translation::Column::ModifiedAt, Expr::cust(CURRENT_TIMESTAMP))
            .filter(translation::Column::Id.eq(*id))
            .filter(translation::Column::IsTranslated.eq(false))
            .exec(txn)
            .await?;
        finalized += result.rows_affected;
    }
    Ok(finalized)
}
