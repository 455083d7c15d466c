//! Nomination repository.

use std::sync::Arc;

use crate::entities::{Nomination, nomination};
use goty_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Number of nominations a game received in one category.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct NomineeCount {
    /// Nominated game.
    pub game_id: String,
    /// Distinct users who nominated it.
    pub nominations: i64,
}

/// Nomination repository for database operations.
#[derive(Clone)]
pub struct NominationRepository {
    db: Arc<DatabaseConnection>,
}

impl NominationRepository {
    /// Create a new nomination repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's nomination of a game in a category.
    pub async fn find(
        &self,
        category_id: &str,
        user_id: &str,
        game_id: &str,
    ) -> AppResult<Option<nomination::Model>> {
        Nomination::find()
            .filter(nomination::Column::CategoryId.eq(category_id))
            .filter(nomination::Column::UserId.eq(user_id))
            .filter(nomination::Column::GameId.eq(game_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's nominations in a category, oldest first.
    pub async fn find_by_user_and_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> AppResult<Vec<nomination::Model>> {
        Nomination::find()
            .filter(nomination::Column::CategoryId.eq(category_id))
            .filter(nomination::Column::UserId.eq(user_id))
            .order_by_asc(nomination::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's nominations in a category.
    pub async fn count_by_user_and_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> AppResult<u64> {
        Nomination::find()
            .filter(nomination::Column::CategoryId.eq(category_id))
            .filter(nomination::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any user nominated `game_id` in the category.
    pub async fn is_nominee(&self, category_id: &str, game_id: &str) -> AppResult<bool> {
        let count = Nomination::find()
            .filter(nomination::Column::CategoryId.eq(category_id))
            .filter(nomination::Column::GameId.eq(game_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Nomination totals per game in a category, highest first.
    pub async fn count_by_game(&self, category_id: &str) -> AppResult<Vec<NomineeCount>> {
        Nomination::find()
            .filter(nomination::Column::CategoryId.eq(category_id))
            .select_only()
            .column(nomination::Column::GameId)
            .column_as(Expr::col(nomination::Column::Id).count(), "nominations")
            .group_by(nomination::Column::GameId)
            .order_by_desc(Expr::col(nomination::Column::Id).count())
            .into_model::<NomineeCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new nomination.
    ///
    /// A unique-index violation on (category, user, game) surfaces as
    /// [`AppError::DuplicateNomination`].
    pub async fn create(&self, model: nomination::ActiveModel) -> AppResult<nomination::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                AppError::DuplicateNomination
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a nomination.
    pub async fn delete(&self, model: nomination::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
