//! Business logic services.

#![allow(missing_docs)]

pub mod category;
pub mod game;
pub mod nomination;
pub mod revalidation;
pub mod upload;
pub mod user;
pub mod vote;

pub use category::{
    CATEGORY_CACHE_PREFIXES, CategoryService, CreateCategoryInput, UpdateCategoryInput,
};
pub use game::{GameService, ModerateGameInput, ModerationDecision, ProposeGameInput};
pub use nomination::{NominationService, Nominee, UserNominations, nominees_page_path};
pub use revalidation::{Revalidated, RevalidationService};
pub use upload::UploadService;
pub use user::{RegisterInput, UserPage, UserService, UserStats};
pub use vote::{GameResult, VoteService, VotedCategory};
