//! Database entities.

pub mod category;
pub mod game;
pub mod nomination;
pub mod user;
pub mod vote;

pub use category::Entity as Category;
pub use game::Entity as Game;
pub use nomination::Entity as Nomination;
pub use user::Entity as User;
pub use vote::Entity as Vote;
