//! Create nomination table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Nomination::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Nomination::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Nomination::CategoryId).string_len(32).not_null())
                    .col(ColumnDef::new(Nomination::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Nomination::GameId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Nomination::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_nomination_category")
                            .from(Nomination::Table, Nomination::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_nomination_user")
                            .from(Nomination::Table, Nomination::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_nomination_game")
                            .from(Nomination::Table, Nomination::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one nomination per (category, user, game)
        manager
            .create_index(
                Index::create()
                    .name("idx_nomination_category_user_game")
                    .table(Nomination::Table)
                    .col(Nomination::CategoryId)
                    .col(Nomination::UserId)
                    .col(Nomination::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (category_id, game_id) for nominee counts
        manager
            .create_index(
                Index::create()
                    .name("idx_nomination_category_game")
                    .table(Nomination::Table)
                    .col(Nomination::CategoryId)
                    .col(Nomination::GameId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Nomination::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Nomination {
    Table,
    Id,
    CategoryId,
    UserId,
    GameId,
    CreatedAt,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Game {
    Table,
    Id,
}
