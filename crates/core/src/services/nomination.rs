//! Nomination ledger service.

use std::sync::Arc;

use goty_common::{AppError, AppResult, IdGenerator, PageCache, config::VotingConfig};
use goty_db::{
    entities::{category::CategoryPhase, game, game::GameStatus, nomination},
    repositories::{CategoryRepository, GameRepository, NominationRepository},
};
use sea_orm::Set;
use tracing::{info, warn};

/// A user's nominations within one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNominations {
    pub count: usize,
    pub game_ids: Vec<String>,
}

/// A nominated game with its nomination count.
#[derive(Debug, Clone)]
pub struct Nominee {
    pub game: game::Model,
    pub nominations: i64,
}

/// Nomination service for business logic.
#[derive(Clone)]
pub struct NominationService {
    category_repo: CategoryRepository,
    game_repo: GameRepository,
    nomination_repo: NominationRepository,
    page_cache: Arc<dyn PageCache>,
    id_gen: IdGenerator,
    max_per_category: u64,
}

/// Cached public page listing a category's nominees.
#[must_use]
pub fn nominees_page_path(category_id: &str) -> String {
    format!("/api/categories/{category_id}/nominees")
}

impl NominationService {
    /// Create a new nomination service.
    #[must_use]
    pub fn new(
        category_repo: CategoryRepository,
        game_repo: GameRepository,
        nomination_repo: NominationRepository,
        page_cache: Arc<dyn PageCache>,
        voting: &VotingConfig,
    ) -> Self {
        Self {
            category_repo,
            game_repo,
            nomination_repo,
            page_cache,
            id_gen: IdGenerator::new(),
            max_per_category: voting.max_nominations_per_category,
        }
    }

    /// Nominate a game in a category.
    pub async fn add(
        &self,
        category_id: &str,
        game_id: &str,
        user_id: &str,
    ) -> AppResult<nomination::Model> {
        let category = self.category_repo.get_by_id(category_id).await?;

        if category.phase != CategoryPhase::Nomination {
            return Err(AppError::InvalidPhase(format!(
                "Category {category_id} is in the {} phase",
                category.phase.as_str()
            )));
        }

        let game = self.game_repo.get_by_id(game_id).await?;

        if game.status != GameStatus::Validated {
            return Err(AppError::BadRequest(format!(
                "Game {game_id} has not been validated"
            )));
        }

        if self
            .nomination_repo
            .find(category_id, user_id, game_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateNomination);
        }

        let count = self
            .nomination_repo
            .count_by_user_and_category(user_id, category_id)
            .await?;
        if count >= self.max_per_category {
            return Err(AppError::Conflict(format!(
                "Maximum of {} nominations per category reached",
                self.max_per_category
            )));
        }

        let model = nomination::ActiveModel {
            id: Set(self.id_gen.generate()),
            category_id: Set(category_id.to_string()),
            user_id: Set(user_id.to_string()),
            game_id: Set(game_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.nomination_repo.create(model).await?;
        info!(category_id = %category_id, game_id = %game_id, user_id = %user_id, "Added nomination");
        self.invalidate_nominees(category_id).await;

        Ok(created)
    }

    /// Withdraw a nomination.
    pub async fn remove(&self, category_id: &str, game_id: &str, user_id: &str) -> AppResult<()> {
        let category = self.category_repo.get_by_id(category_id).await?;

        if category.phase != CategoryPhase::Nomination {
            return Err(AppError::InvalidPhase(format!(
                "Category {category_id} is in the {} phase",
                category.phase.as_str()
            )));
        }

        let nomination = self
            .nomination_repo
            .find(category_id, user_id, game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Nomination of {game_id}")))?;

        self.nomination_repo.delete(nomination).await?;
        info!(category_id = %category_id, game_id = %game_id, user_id = %user_id, "Removed nomination");
        self.invalidate_nominees(category_id).await;

        Ok(())
    }

    /// A user's nominated game IDs in a category.
    pub async fn user_nominations(
        &self,
        category_id: &str,
        user_id: &str,
    ) -> AppResult<UserNominations> {
        let nominations = self
            .nomination_repo
            .find_by_user_and_category(user_id, category_id)
            .await?;

        let game_ids: Vec<String> = nominations.into_iter().map(|n| n.game_id).collect();

        Ok(UserNominations {
            count: game_ids.len(),
            game_ids,
        })
    }

    /// Nominated games of a category, most nominated first, ties by name.
    pub async fn nominees(&self, category_id: &str) -> AppResult<Vec<Nominee>> {
        self.category_repo.get_by_id(category_id).await?;

        let counts = self.nomination_repo.count_by_game(category_id).await?;
        let ids: Vec<String> = counts.iter().map(|c| c.game_id.clone()).collect();
        let games = self.game_repo.find_by_ids(&ids).await?;

        let mut nominees: Vec<Nominee> = counts
            .into_iter()
            .filter_map(|c| {
                games
                    .iter()
                    .find(|g| g.id == c.game_id)
                    .map(|g| Nominee {
                        game: g.clone(),
                        nominations: c.nominations,
                    })
            })
            .collect();

        nominees.sort_by(|a, b| {
            b.nominations
                .cmp(&a.nominations)
                .then_with(|| a.game.name.cmp(&b.game.name))
        });

        Ok(nominees)
    }

    async fn invalidate_nominees(&self, category_id: &str) {
        let path = nominees_page_path(category_id);
        if let Err(e) = self.page_cache.invalidate_path(&path).await {
            warn!(error = %e, path = %path, "Failed to invalidate nominees page");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goty_common::{CachedPage, InMemoryPageCache};
    use goty_db::entities::category;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_category(phase: CategoryPhase) -> category::Model {
        category::Model {
            id: "cat1".to_string(),
            name: "Best Soundtrack".to_string(),
            slug: "best-soundtrack".to_string(),
            description: None,
            year: 2025,
            phase,
            is_validated: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_game(id: &str, name: &str, status: GameStatus) -> game::Model {
        game::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
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

    fn create_test_nomination(game_id: &str) -> nomination::Model {
        nomination::Model {
            id: format!("n-{game_id}"),
            category_id: "cat1".to_string(),
            user_id: "user1".to_string(),
            game_id: game_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn create_service(
        category_db: MockDatabase,
        game_db: MockDatabase,
        nomination_db: MockDatabase,
    ) -> NominationService {
        create_service_with_cache(
            category_db,
            game_db,
            nomination_db,
            Arc::new(InMemoryPageCache::default()),
        )
    }

    fn create_service_with_cache(
        category_db: MockDatabase,
        game_db: MockDatabase,
        nomination_db: MockDatabase,
        cache: Arc<InMemoryPageCache>,
    ) -> NominationService {
        NominationService::new(
            CategoryRepository::new(Arc::new(category_db.into_connection())),
            GameRepository::new(Arc::new(game_db.into_connection())),
            NominationRepository::new(Arc::new(nomination_db.into_connection())),
            cache,
            &VotingConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_add_nomination_success() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_game("g1", "Hades", GameStatus::Validated)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<nomination::Model>::new()])
            .append_query_results([[count_row(2)]])
            .append_query_results([[create_test_nomination("g1")]]);

        let service = create_service(category_db, game_db, nomination_db);
        let result = service.add("cat1", "g1", "user1").await.unwrap();

        assert_eq!(result.game_id, "g1");
    }

    #[tokio::test]
    async fn test_add_and_remove_purge_cached_nominees() {
        let cache = Arc::new(InMemoryPageCache::default());
        let path = nominees_page_path("cat1");
        cache
            .put(&path, CachedPage::json(b"[]".to_vec()))
            .await
            .unwrap();

        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]])
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_game("g1", "Hades", GameStatus::Validated)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<nomination::Model>::new()])
            .append_query_results([[count_row(0)]])
            .append_query_results([[create_test_nomination("g1")]])
            .append_query_results([[create_test_nomination("g1")]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let service =
            create_service_with_cache(category_db, game_db, nomination_db, cache.clone());

        service.add("cat1", "g1", "user1").await.unwrap();
        assert!(cache.get(&path).await.unwrap().is_none());

        cache
            .put(&path, CachedPage::json(b"[]".to_vec()))
            .await
            .unwrap();
        service.remove("cat1", "g1", "user1").await.unwrap();
        assert!(cache.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_nomination_outside_phase_is_rejected() {
        for phase in [CategoryPhase::Vote, CategoryPhase::Closed] {
            let category_db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_category(phase)]]);

            // Phase is checked before the game is looked up
            let service = create_service(
                category_db,
                MockDatabase::new(DatabaseBackend::Postgres),
                MockDatabase::new(DatabaseBackend::Postgres),
            );
            let result = service.add("cat1", "missing-game", "user1").await;

            assert!(matches!(result, Err(AppError::InvalidPhase(_))));
        }
    }

    #[tokio::test]
    async fn test_add_duplicate_nomination_fails() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_game("g1", "Hades", GameStatus::Validated)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_nomination("g1")]]);

        let service = create_service(category_db, game_db, nomination_db);
        let result = service.add("cat1", "g1", "user1").await;

        assert!(matches!(result, Err(AppError::DuplicateNomination)));
    }

    #[tokio::test]
    async fn test_add_nomination_cap_reached() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_game("g6", "Celeste", GameStatus::Validated)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<nomination::Model>::new()])
            .append_query_results([[count_row(5)]]);

        let service = create_service(category_db, game_db, nomination_db);
        let result = service.add("cat1", "g6", "user1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_add_unvalidated_game_is_rejected() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_game("g1", "Hades", GameStatus::Sent)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = create_service(category_db, game_db, nomination_db);
        let result = service.add("cat1", "g1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_add_missing_category_is_not_found() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()]);

        let service = create_service(
            category_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );
        let result = service.add("missing", "g1", "user1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_after_nomination_phase_is_rejected() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Vote)]]);

        let service = create_service(
            category_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );
        let result = service.remove("cat1", "g1", "user1").await;

        assert!(matches!(result, Err(AppError::InvalidPhase(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_nomination_is_not_found() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Nomination)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<nomination::Model>::new()]);

        let service = create_service(
            category_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            nomination_db,
        );
        let result = service.remove("cat1", "g1", "user1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_user_nominations() {
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            create_test_nomination("g1"),
            create_test_nomination("g2"),
        ]]);

        let service = create_service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            nomination_db,
        );
        let result = service.user_nominations("cat1", "user1").await.unwrap();

        assert_eq!(
            result,
            UserNominations {
                count: 2,
                game_ids: vec!["g1".to_string(), "g2".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_nominees_sorted_by_count_then_name() {
        let category_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_category(CategoryPhase::Vote)]]);
        let nomination_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            maplit::btreemap! {
                "game_id" => sea_orm::Value::String(Some(Box::new("g2".to_string()))),
                "nominations" => sea_orm::Value::BigInt(Some(3)),
            },
            maplit::btreemap! {
                "game_id" => sea_orm::Value::String(Some(Box::new("g1".to_string()))),
                "nominations" => sea_orm::Value::BigInt(Some(3)),
            },
            maplit::btreemap! {
                "game_id" => sea_orm::Value::String(Some(Box::new("g3".to_string()))),
                "nominations" => sea_orm::Value::BigInt(Some(1)),
            },
        ]]);
        let game_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            create_test_game("g1", "Astro Bot", GameStatus::Validated),
            create_test_game("g2", "Balatro", GameStatus::Validated),
            create_test_game("g3", "Animal Well", GameStatus::Validated),
        ]]);

        let service = create_service(category_db, game_db, nomination_db);
        let nominees = service.nominees("cat1").await.unwrap();

        let names: Vec<&str> = nominees.iter().map(|n| n.game.name.as_str()).collect();
        assert_eq!(names, vec!["Astro Bot", "Balatro", "Animal Well"]);
    }
}
