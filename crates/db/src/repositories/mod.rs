//! Repository layer for database operations.

mod category;
mod game;
mod nomination;
mod user;
mod vote;

pub use category::CategoryRepository;
pub use game::GameRepository;
pub use nomination::{NominationRepository, NomineeCount};
pub use user::UserRepository;
pub use vote::{VoteRepository, VoteTally};
