//! Category entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category lifecycle stage. Only moves forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CategoryPhase {
    #[sea_orm(string_value = "nomination")]
    #[default]
    Nomination,
    #[sea_orm(string_value = "vote")]
    Vote,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl CategoryPhase {
    /// The phase that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Nomination => Some(Self::Vote),
            Self::Vote => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Lowercase name as exposed over the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nomination => "nomination",
            Self::Vote => "vote",
            Self::Closed => "closed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Edition year this category belongs to
    #[sea_orm(indexed)]
    pub year: i32,

    pub phase: CategoryPhase,

    /// Hidden from public listings until validated by an admin
    #[sea_orm(default_value = false)]
    pub is_validated: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::nomination::Entity")]
    Nominations,

    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,
}

impl Related<super::nomination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Nominations.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
