//! Category directory service.

use std::sync::Arc;

use goty_common::{AppError, AppResult, IdGenerator, PageCache};
use goty_db::{
    entities::{category, category::CategoryPhase},
    repositories::CategoryRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::slugify;

/// Cache key prefixes covering every public category page.
pub const CATEGORY_CACHE_PREFIXES: &[&str] = &["/api/categories", "/api/category/"];

/// Category service for business logic.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    page_cache: Arc<dyn PageCache>,
    id_gen: IdGenerator,
}

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 1970, max = 2100))]
    pub year: i32,

    pub is_validated: Option<bool>,
}

/// Input for updating a category.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub is_validated: Option<bool>,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(category_repo: CategoryRepository, page_cache: Arc<dyn PageCache>) -> Self {
        Self {
            category_repo,
            page_cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a category by ID.
    pub async fn get(&self, id: &str) -> AppResult<category::Model> {
        self.category_repo.get_by_id(id).await
    }

    /// Get a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {slug}")))
    }

    /// List categories by year and validation state, ordered by name.
    pub async fn list(
        &self,
        year: Option<i32>,
        validated: Option<bool>,
    ) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_filtered(year, validated).await
    }

    /// Validated categories of `year` whose nominee list is frozen.
    pub async fn list_nominated(&self, year: i32) -> AppResult<Vec<category::Model>> {
        self.category_repo
            .find_validated_in_phases(year, &[CategoryPhase::Vote, CategoryPhase::Closed])
            .await
    }

    /// Create a category in the nomination phase.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Category name must contain letters or digits".to_string(),
            ));
        }

        if self.category_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Category with slug '{slug}' already exists"
            )));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            year: Set(input.year),
            phase: Set(CategoryPhase::Nomination),
            is_validated: Set(input.is_validated.unwrap_or(false)),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let category = self.category_repo.create(model).await?;
        info!(category_id = %category.id, slug = %category.slug, "Created category");
        self.invalidate_pages().await;

        Ok(category)
    }

    /// Update a category's name, description or validation flag.
    ///
    /// The slug stays fixed once created.
    pub async fn update(&self, id: &str, input: UpdateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let category = self.category_repo.get_by_id(id).await?;
        let mut active: category::ActiveModel = category.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_validated) = input.is_validated {
            active.is_validated = Set(is_validated);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.category_repo.update(active).await?;
        self.invalidate_pages().await;

        Ok(updated)
    }

    /// Move a category to its next phase.
    pub async fn advance_phase(&self, id: &str) -> AppResult<category::Model> {
        let category = self.category_repo.get_by_id(id).await?;
        let current = category.phase;

        let next = current.next().ok_or_else(|| {
            AppError::InvalidTransition(format!("Category {id} is already closed"))
        })?;

        let moved = self
            .category_repo
            .transition_phase(id, current, next, chrono::Utc::now())
            .await?;
        if !moved {
            return Err(AppError::InvalidTransition(format!(
                "Category {id} left the {} phase before this change",
                current.as_str()
            )));
        }

        let updated = self.category_repo.get_by_id(id).await?;
        info!(
            category_id = %id,
            from = current.as_str(),
            to = next.as_str(),
            "Advanced category phase"
        );
        self.invalidate_pages().await;

        Ok(updated)
    }

    /// Purge cached category pages. Failures only cost freshness.
    async fn invalidate_pages(&self) {
        for prefix in CATEGORY_CACHE_PREFIXES {
            if let Err(e) = self.page_cache.invalidate_prefix(prefix).await {
                warn!(error = %e, prefix = %prefix, "Failed to invalidate category pages");
            }
        }
    }
}
