use sea_orm::entity::prelude::*;
use serde::Serialize;

pub const ADMIN: &str = "Admin";
pub const VENDOR: &str = "Vendor";
pub const CUSTOMER: &str = "Customer";

/// Roles ensured at startup.
pub const DEFAULT_ROLES: [(&str, &str); 3] = [
    (ADMIN, "Back-office administrator"),
    (VENDOR, "Sells products through the catalog"),
    (CUSTOMER, "Buys products"),
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "roles")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_on: Option<DateTimeUtc>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<DateTimeUtc>,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::entities::user_role::Entity")]
    UserRole,
}

impl Related<crate::entities::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        crate::entities::user_role::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(crate::entities::user_role::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
