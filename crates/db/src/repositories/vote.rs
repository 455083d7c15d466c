//! Vote repository.

use std::sync::Arc;

use crate::entities::{Vote, vote};
use goty_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Number of votes a game received in one category.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct VoteTally {
    /// Game voted for.
    pub game_id: String,
    /// Votes received.
    pub votes: i64,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote in a category.
    pub async fn find_by_user_and_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::CategoryId.eq(category_id))
            .filter(vote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes cast by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .order_by_desc(vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote totals per game in a category, highest first.
    pub async fn tally(&self, category_id: &str) -> AppResult<Vec<VoteTally>> {
        Vote::find()
            .filter(vote::Column::CategoryId.eq(category_id))
            .select_only()
            .column(vote::Column::GameId)
            .column_as(Expr::col(vote::Column::Id).count(), "votes")
            .group_by(vote::Column::GameId)
            .order_by_desc(Expr::col(vote::Column::Id).count())
            .into_model::<VoteTally>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote, or replace the game of the user's existing vote in the
    /// category. Returns the stored row.
    ///
    /// Concurrent writers for the same (category, user) resolve to the last one.
    pub async fn upsert(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        Vote::insert(model)
            .on_conflict(
                OnConflict::columns([vote::Column::CategoryId, vote::Column::UserId])
                    .update_column(vote::Column::GameId)
                    .value(vote::Column::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_vote(category_id: &str, game_id: &str) -> vote::Model {
        vote::Model {
            id: format!("v-{category_id}"),
            category_id: category_id.to_string(),
            user_id: "user1".to_string(),
            game_id: game_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_category_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo
            .find_by_user_and_category("user1", "cat1")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_vote("cat1", "g1"),
                    create_test_vote("cat2", "g5"),
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_tally() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "game_id" => sea_orm::Value::String(Some(Box::new("g1".to_string()))),
                    "votes" => sea_orm::Value::BigInt(Some(12)),
                }]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let tally = repo.tally("cat1").await.unwrap();

        assert_eq!(
            tally,
            vec![VoteTally {
                game_id: "g1".to_string(),
                votes: 12
            }]
        );
    }

    #[tokio::test]
    async fn test_upsert_resolves_conflict_on_category_and_user() {
        let stored = vote::Model {
            updated_at: Some(Utc::now().into()),
            ..create_test_vote("cat1", "g2")
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(Arc::clone(&db));
        let model = vote::ActiveModel {
            id: sea_orm::Set("v-new".to_string()),
            category_id: sea_orm::Set("cat1".to_string()),
            user_id: sea_orm::Set("user1".to_string()),
            game_id: sea_orm::Set("g2".to_string()),
            created_at: sea_orm::Set(Utc::now().into()),
            updated_at: sea_orm::Set(None),
        };
        let result = repo.upsert(model).await.unwrap();

        // The existing row keeps its id
        assert_eq!(result.id, stored.id);
        assert_eq!(result.game_id, "g2");

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO UPDATE"));
    }
}
