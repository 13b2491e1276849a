use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    /// ULID, 26 characters
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    /// `YYYY-MM-DD`
    pub published_on: Option<String>,
    pub isbn: Option<String>,
    pub classification_detail_code: String,
    pub division_code: String,
    pub is_disposed: bool,
    /// `YYYY-MM-DD`; only set on disposed books
    pub disposed_on: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classification_detail::Entity",
        from = "Column::ClassificationDetailCode",
        to = "super::classification_detail::Column::Code",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    ClassificationDetail,
    #[sea_orm(
        belongs_to = "super::division::Entity",
        from = "Column::DivisionCode",
        to = "super::division::Column::Code",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Division,
}

impl Related<super::classification_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationDetail.def()
    }
}

impl Related<super::division::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Division.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
