//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category, category::CategoryPhase};
use goty_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<category::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {id}")))
    }

    /// Find a category by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find categories by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Category::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List categories, optionally filtered by year and validation state.
    pub async fn find_filtered(
        &self,
        year: Option<i32>,
        validated: Option<bool>,
    ) -> AppResult<Vec<category::Model>> {
        let mut query = Category::find().order_by_asc(category::Column::Name);

        if let Some(y) = year {
            query = query.filter(category::Column::Year.eq(y));
        }

        if let Some(v) = validated {
            query = query.filter(category::Column::IsValidated.eq(v));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Validated categories of a year whose phase is one of `phases`.
    pub async fn find_validated_in_phases(
        &self,
        year: i32,
        phases: &[CategoryPhase],
    ) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(category::Column::Year.eq(year))
            .filter(category::Column::IsValidated.eq(true))
            .filter(category::Column::Phase.is_in(phases.iter().copied()))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a category from `from` to `to` if it is still in `from`.
    ///
    /// Returns `false` when the phase changed since it was read.
    pub async fn transition_phase(
        &self,
        id: &str,
        from: CategoryPhase,
        to: CategoryPhase,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = Category::update_many()
            .col_expr(category::Column::Phase, Expr::value(to.as_str()))
            .col_expr(category::Column::UpdatedAt, Expr::value(at))
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::Phase.eq(from))
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

    fn create_test_category(id: &str, phase: CategoryPhase) -> category::Model {
        category::Model {
            id: id.to_string(),
            name: format!("Category {id}"),
            slug: format!("category-{id}"),
            description: None,
            year: 2025,
            phase,
            is_validated: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_filtered_by_year() {
        let c1 = create_test_category("c1", CategoryPhase::Nomination);
        let c2 = create_test_category("c2", CategoryPhase::Vote);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_filtered(Some(2025), None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_validated_in_phases() {
        let closed = create_test_category("c3", CategoryPhase::Closed);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[closed]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo
            .find_validated_in_phases(2025, &[CategoryPhase::Vote, CategoryPhase::Closed])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].phase, CategoryPhase::Closed);
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = CategoryRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_transition_phase_stale_read_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let moved = repo
            .transition_phase("c1", CategoryPhase::Nomination, CategoryPhase::Vote, Utc::now())
            .await
            .unwrap();

        assert!(!moved);
    }
}
