use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classification_detail::Entity")]
    ClassificationDetails,
}

impl Related<super::classification_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
