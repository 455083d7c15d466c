//! Game entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation outcome of a proposed game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum GameStatus {
    #[sea_orm(string_value = "sent")]
    #[default]
    Sent,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "moderated")]
    Moderated,
}

impl GameStatus {
    /// Lowercase name as exposed over the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Validated => "validated",
            Self::Moderated => "moderated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Cover image URL
    #[sea_orm(nullable)]
    pub cover_url: Option<String>,

    #[sea_orm(nullable)]
    pub release_year: Option<i32>,

    pub status: GameStatus,

    /// User who proposed the game
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Moderator comment attached to the decision
    #[sea_orm(column_type = "Text", nullable)]
    pub moderation_comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub moderated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
