//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_user_table;
mod m20260101_000002_create_category_table;
mod m20260101_000003_create_game_table;
mod m20260101_000004_create_nomination_table;
mod m20260101_000005_create_vote_table;

/// Migrator running every schema migration in order.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_user_table::Migration),
            Box::new(m20260101_000002_create_category_table::Migration),
            Box::new(m20260101_000003_create_game_table::Migration),
            Box::new(m20260101_000004_create_nomination_table::Migration),
            Box::new(m20260101_000005_create_vote_table::Migration),
        ]
    }
}
