//! Vote ledger service.

use goty_common::{AppError, AppResult, IdGenerator};
use goty_db::{
    entities::{category, category::CategoryPhase, game, user, vote},
    repositories::{CategoryRepository, GameRepository, NominationRepository, VoteRepository},
};
use sea_orm::Set;
use tracing::info;

/// A category the user voted in, with the chosen game.
#[derive(Debug, Clone)]
pub struct VotedCategory {
    pub category: category::Model,
    pub game: game::Model,
}

/// Vote total for one game.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub game: game::Model,
    pub votes: i64,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    category_repo: CategoryRepository,
    game_repo: GameRepository,
    nomination_repo: NominationRepository,
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        category_repo: CategoryRepository,
        game_repo: GameRepository,
        nomination_repo: NominationRepository,
        vote_repo: VoteRepository,
    ) -> Self {
        Self {
            category_repo,
            game_repo,
            nomination_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast or replace the user's vote in a category.
    pub async fn cast(
        &self,
        category_id: &str,
        game_id: &str,
        user_id: &str,
    ) -> AppResult<vote::Model> {
        let category = self.category_repo.get_by_id(category_id).await?;

        if category.phase != CategoryPhase::Vote {
            return Err(AppError::InvalidPhase(format!(
                "Category {category_id} is in the {} phase",
                category.phase.as_str()
            )));
        }

        if !self.nomination_repo.is_nominee(category_id, game_id).await? {
            return Err(AppError::BadRequest(format!(
                "Game {game_id} is not a nominee of category {category_id}"
            )));
        }

        if let Some(existing) = self
            .vote_repo
            .find_by_user_and_category(user_id, category_id)
            .await?
            && existing.game_id == game_id
        {
            return Ok(existing);
        }

        // Concurrent writers for the same (category, user) resolve to the last one
        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            category_id: Set(category_id.to_string()),
            user_id: Set(user_id.to_string()),
            game_id: Set(game_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let stored = self.vote_repo.upsert(model).await?;
        info!(category_id = %category_id, user_id = %user_id, game_id = %game_id, "Cast vote");

        Ok(stored)
    }

    /// The game the user voted for in a category, if any.
    pub async fn my_vote(&self, category_id: &str, user_id: &str) -> AppResult<Option<String>> {
        Ok(self
            .vote_repo
            .find_by_user_and_category(user_id, category_id)
            .await?
            .map(|v| v.game_id))
    }

    /// Every category the user voted in, with the chosen game.
    pub async fn my_voted_categories(&self, user_id: &str) -> AppResult<Vec<VotedCategory>> {
        let votes = self.vote_repo.find_by_user(user_id).await?;
        if votes.is_empty() {
            return Ok(vec![]);
        }

        let category_ids: Vec<String> = votes.iter().map(|v| v.category_id.clone()).collect();
        let game_ids: Vec<String> = votes.iter().map(|v| v.game_id.clone()).collect();

        let categories = self.category_repo.find_by_ids(&category_ids).await?;
        let games = self.game_repo.find_by_ids(&game_ids).await?;

        // Category order (by name) wins over vote order
        Ok(categories
            .into_iter()
            .filter_map(|category| {
                let vote = votes.iter().find(|v| v.category_id == category.id)?;
                let game = games.iter().find(|g| g.id == vote.game_id)?.clone();
                Some(VotedCategory { category, game })
            })
            .collect())
    }

    /// Vote totals for a category, highest first.
    ///
    /// Visible to everyone once the category is closed; admins may peek earlier.
    pub async fn results(
        &self,
        category_id: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<GameResult>> {
        let category = self.category_repo.get_by_id(category_id).await?;

        let is_admin = viewer.is_some_and(user::Model::is_admin);
        if category.phase != CategoryPhase::Closed && !is_admin {
            return Err(AppError::Forbidden(
                "Results are published once the category is closed".to_string(),
            ));
        }

        let tally = self.vote_repo.tally(category_id).await?;
        let ids: Vec<String> = tally.iter().map(|t| t.game_id.clone()).collect();
        let games = self.game_repo.find_by_ids(&ids).await?;

        let mut results: Vec<GameResult> = tally
            .into_iter()
            .filter_map(|t| {
                games.iter().find(|g| g.id == t.game_id).map(|g| GameResult {
                    game: g.clone(),
                    votes: t.votes,
                })
            })
            .collect();

        results.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.game.name.cmp(&b.game.name)));

        Ok(results)
    }
}
