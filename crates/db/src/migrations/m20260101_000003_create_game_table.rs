//! Create game table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Game::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Game::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Game::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Game::Slug).string_len(160).not_null())
                    .col(ColumnDef::new(Game::Description).text())
                    .col(ColumnDef::new(Game::CoverUrl).string_len(1024))
                    .col(ColumnDef::new(Game::ReleaseYear).integer())
                    .col(
                        ColumnDef::new(Game::Status)
                            .string_len(16)
                            .not_null()
                            .default("sent"),
                    )
                    .col(ColumnDef::new(Game::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Game::ModerationComment).text())
                    .col(
                        ColumnDef::new(Game::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Game::ModeratedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_author")
                            .from(Game::Table, Game::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug
        manager
            .create_index(
                Index::create()
                    .name("idx_game_slug")
                    .table(Game::Table)
                    .col(Game::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (author_id, created_at) for the yearly proposal cap
        manager
            .create_index(
                Index::create()
                    .name("idx_game_author_created_at")
                    .table(Game::Table)
                    .col(Game::AuthorId)
                    .col(Game::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: status (moderation queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_game_status")
                    .table(Game::Table)
                    .col(Game::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Game::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Game {
    Table,
    Id,
    Name,
    Slug,
    Description,
    CoverUrl,
    ReleaseYear,
    Status,
    AuthorId,
    ModerationComment,
    CreatedAt,
    ModeratedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
