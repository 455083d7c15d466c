//! Game proposal and moderation service.

use chrono::{Datelike, TimeZone, Utc};
use goty_common::{AppError, AppResult, IdGenerator, config::VotingConfig};
use goty_db::{
    entities::{game, game::GameStatus},
    repositories::GameRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::slugify;

/// Default page size for game listings.
const DEFAULT_LIMIT: u64 = 20;

/// Upper bound on page size for game listings.
const MAX_LIMIT: u64 = 100;

/// Game service for business logic.
#[derive(Clone)]
pub struct GameService {
    game_repo: GameRepository,
    id_gen: IdGenerator,
    max_proposals_per_year: u64,
}

/// Input for proposing a game.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProposeGameInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 1024))]
    pub cover_url: Option<String>,

    #[validate(range(min = 1950, max = 2100))]
    pub release_year: Option<i32>,
}

/// Outcome chosen by a moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Validated,
    Moderated,
}

impl From<ModerationDecision> for GameStatus {
    fn from(decision: ModerationDecision) -> Self {
        match decision {
            ModerationDecision::Validated => Self::Validated,
            ModerationDecision::Moderated => Self::Moderated,
        }
    }
}

/// Input for moderating a game.
#[derive(Debug, Deserialize, Validate)]
pub struct ModerateGameInput {
    pub decision: ModerationDecision,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl GameService {
    /// Create a new game service.
    #[must_use]
    pub const fn new(game_repo: GameRepository, voting: &VotingConfig) -> Self {
        Self {
            game_repo,
            id_gen: IdGenerator::new(),
            max_proposals_per_year: voting.max_proposals_per_year,
        }
    }

    /// Propose a new game for moderation.
    pub async fn propose(&self, author_id: &str, input: ProposeGameInput) -> AppResult<game::Model> {
        input.validate()?;

        let now = Utc::now();
        let year_start = Utc
            .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::Internal("Invalid start of year".to_string()))?;

        let proposed = self
            .game_repo
            .count_by_author_since(author_id, year_start)
            .await?;
        if proposed >= self.max_proposals_per_year {
            return Err(AppError::RateLimitExceeded(format!(
                "At most {} game proposals per year",
                self.max_proposals_per_year
            )));
        }

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Game name must contain letters or digits".to_string(),
            ));
        }

        if self.game_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Game with slug '{slug}' already exists"
            )));
        }

        let model = game::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            cover_url: Set(input.cover_url),
            release_year: Set(input.release_year),
            status: Set(GameStatus::Sent),
            author_id: Set(author_id.to_string()),
            moderation_comment: Set(None),
            created_at: Set(now.into()),
            moderated_at: Set(None),
        };

        let game = self.game_repo.create(model).await?;
        info!(game_id = %game.id, author_id = %author_id, "Game proposed");

        Ok(game)
    }

    /// Record a moderation decision on a pending game.
    pub async fn moderate(&self, game_id: &str, input: ModerateGameInput) -> AppResult<game::Model> {
        input.validate()?;

        let game = self.game_repo.get_by_id(game_id).await?;

        if game.status != GameStatus::Sent {
            return Err(AppError::InvalidTransition(format!(
                "Game {game_id} was already {}",
                game.status.as_str()
            )));
        }

        let status: GameStatus = input.decision.into();
        let moved = self
            .game_repo
            .transition_status(game_id, GameStatus::Sent, status, input.comment, Utc::now())
            .await?;
        if !moved {
            return Err(AppError::InvalidTransition(format!(
                "Game {game_id} was moderated by another request"
            )));
        }

        info!(game_id = %game_id, status = status.as_str(), "Game moderated");

        self.game_repo.get_by_id(game_id).await
    }

    /// Get a game by ID.
    pub async fn get(&self, id: &str) -> AppResult<game::Model> {
        self.game_repo.get_by_id(id).await
    }

    /// Get a game by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<game::Model> {
        self.game_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {slug}")))
    }

    /// Validated games, optionally filtered by a name search.
    pub async fn list_validated(
        &self,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<game::Model>> {
        self.game_repo
            .find_validated(search, clamp_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Games proposed by a user.
    pub async fn list_mine(&self, author_id: &str) -> AppResult<Vec<game::Model>> {
        self.game_repo.find_by_author(author_id).await
    }

    /// Games awaiting moderation.
    pub async fn list_pending(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<game::Model>> {
        self.game_repo
            .find_pending(clamp_limit(limit), offset.unwrap_or(0))
            .await
    }
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
