//! Game repository.

use std::sync::Arc;

use crate::entities::{Game, game, game::GameStatus};
use chrono::{DateTime, Utc};
use goty_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Game repository for database operations.
#[derive(Clone)]
pub struct GameRepository {
    db: Arc<DatabaseConnection>,
}

impl GameRepository {
    /// Create a new game repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a game by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<game::Model>> {
        Game::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a game by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<game::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {id}")))
    }

    /// Find a game by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<game::Model>> {
        Game::find()
            .filter(game::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find games by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<game::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Game::find()
            .filter(game::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Validated games, optionally matching `search` in the name, ordered by name.
    pub async fn find_validated(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<game::Model>> {
        let mut query = Game::find()
            .filter(game::Column::Status.eq(GameStatus::Validated))
            .order_by_asc(game::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(Expr::expr(Func::lower(Expr::col(game::Column::Name))).like(pattern));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Games awaiting moderation, oldest first.
    pub async fn find_pending(&self, limit: u64, offset: u64) -> AppResult<Vec<game::Model>> {
        Game::find()
            .filter(game::Column::Status.eq(GameStatus::Sent))
            .order_by_asc(game::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Games proposed by a user, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<game::Model>> {
        Game::find()
            .filter(game::Column::AuthorId.eq(author_id))
            .order_by_desc(game::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count games a user proposed at or after `since`.
    pub async fn count_by_author_since(
        &self,
        author_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        Game::find()
            .filter(game::Column::AuthorId.eq(author_id))
            .filter(game::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new game.
    pub async fn create(&self, model: game::ActiveModel) -> AppResult<game::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a game from `from` to `to`, recording the moderation comment.
    ///
    /// The write only applies while the game is still in `from`. Returns
    /// `false` when another request changed the status first.
    pub async fn transition_status(
        &self,
        id: &str,
        from: GameStatus,
        to: GameStatus,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = Game::update_many()
            .col_expr(game::Column::Status, Expr::value(to.as_str()))
            .col_expr(game::Column::ModerationComment, Expr::value(comment))
            .col_expr(game::Column::ModeratedAt, Expr::value(at))
            .filter(game::Column::Id.eq(id))
            .filter(game::Column::Status.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_game(id: &str, status: GameStatus) -> game::Model {
        game::Model {
            id: id.to_string(),
            name: format!("Game {id}"),
            slug: format!("game-{id}"),
            description: None,
            cover_url: None,
            release_year: Some(2025),
            status,
            author_id: "author1".to_string(),
            moderation_comment: None,
            created_at: Utc::now().into(),
            moderated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let game = create_test_game("g1", GameStatus::Validated);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[game]])
                .into_connection(),
        );

        let repo = GameRepository::new(db);
        let result = repo.find_by_slug("game-g1").await.unwrap();

        assert_eq!(result.unwrap().id, "g1");
    }

    #[tokio::test]
    async fn test_find_validated_with_search() {
        let game = create_test_game("g1", GameStatus::Validated);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[game]])
                .into_connection(),
        );

        let repo = GameRepository::new(db);
        let result = repo.find_validated(Some("Game"), 20, 0).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_count_by_author_since() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = GameRepository::new(db);
        let count = repo
            .count_by_author_since("author1", Utc::now())
            .await
            .unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<game::Model>::new()])
                .into_connection(),
        );

        let repo = GameRepository::new(db);
        assert!(matches!(
            repo.get_by_id("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transition_status_only_from_expected_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = GameRepository::new(Arc::clone(&db));
        let first = repo
            .transition_status("g1", GameStatus::Sent, GameStatus::Validated, None, Utc::now())
            .await
            .unwrap();
        let second = repo
            .transition_status(
                "g1",
                GameStatus::Sent,
                GameStatus::Moderated,
                Some("spam".to_string()),
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        // Guarded by the current status
        assert!(log.contains(r#"\"game\".\"status\" = "#));
    }
}
