use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::entities::category::Entity as Category;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    #[sea_orm(column_type = "Json")]
    pub image_urls: ImageUrls,
    #[sea_orm(indexed)]
    pub category_id: Option<Uuid>,
    #[sea_orm(indexed)]
    pub created_by: Option<Uuid>,
    pub created_on: Option<DateTimeUtc>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<DateTimeUtc>,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

/// Image links stored as a JSON array next to the product row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ImageUrls(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Category",
        from = "crate::entities::product::Column::CategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<crate::entities::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
