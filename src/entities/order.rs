use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::status::Entity as Status;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub customer_id: Uuid,
    pub item_count: Option<i32>,
    pub total_price: f64,
    pub current_status_id: Uuid,
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
        belongs_to = "Status",
        from = "Column::CurrentStatusId",
        to = "crate::entities::status::Column::Id"
    )]
    Status,
    #[sea_orm(has_many = "crate::entities::order_part::Entity")]
    OrderPart,
}

impl Related<crate::entities::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<crate::entities::order_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
