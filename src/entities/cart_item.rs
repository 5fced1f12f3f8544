use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::product::Entity as Product;

// One row per add-to-cart call. Rows for the same (customer, product) pair
// are not merged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cart_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_by: Option<Uuid>,
    pub created_on: Option<DateTimeUtc>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<DateTimeUtc>,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Product",
        from = "crate::entities::cart_item::Column::ProductId",
        to = "crate::entities::product::Column::Id"
    )]
    Product,
}

impl Related<crate::entities::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
