use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stored lowercased; lookups lowercase their input too.
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub password_hash: Option<String>,
    #[sea_orm(default_value = 0)]
    pub access_failed_count: i32,
    pub lockout_end: Option<DateTimeUtc>,
    pub created_by: Option<Uuid>,
    pub created_on: Option<DateTimeUtc>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<DateTimeUtc>,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

impl Model {
    pub fn is_locked_out(&self, now: DateTimeUtc) -> bool {
        matches!(self.lockout_end, Some(end) if end > now)
    }
}

/// Public projection of a user. Never carries credentials.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub is_active: bool,
}

impl From<Model> for UserDetails {
    fn from(value: Model) -> Self {
        UserDetails {
            user_id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            address: value.address,
            is_active: value.is_active,
        }
    }
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

impl Related<crate::entities::role::Entity> for Entity {
    fn to() -> RelationDef {
        crate::entities::user_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(crate::entities::user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
