use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::error::{Resource, ServiceError, ServiceResult};

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(length(min = 1, max = 100))]
    pub category_name: String,
    #[validate(length(max = 1000))]
    pub category_description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub category_name: String,
    #[validate(length(max = 1000))]
    pub category_description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryStatus {
    pub id: Uuid,
    pub is_active: bool,
}

pub async fn all_categories(db: &DatabaseConnection) -> ServiceResult<Vec<category::Model>> {
    Ok(CategoryEntity::find()
        .order_by_asc(category::Column::CreatedOn)
        .all(db)
        .await?)
}

pub async fn active_categories(db: &DatabaseConnection) -> ServiceResult<Vec<category::Model>> {
    Ok(CategoryEntity::find()
        .filter(category::Column::IsActive.eq(true))
        .order_by_asc(category::Column::CreatedOn)
        .all(db)
        .await?)
}

/// Returns the category whether or not it is active.
pub async fn get_category(db: &DatabaseConnection, id: Uuid) -> ServiceResult<category::Model> {
    CategoryEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Category))
}

pub(crate) async fn ensure_category(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
    get_category(db, id).await.map(|_| ())
}

pub async fn create_category(
    db: &DatabaseConnection,
    payload: NewCategory,
    actor: Uuid,
) -> ServiceResult<category::Model> {
    payload.validate()?;
    let now = Utc::now();

    let model = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_name: Set(Some(payload.category_name)),
        category_description: Set(payload.category_description),
        created_by: Set(Some(actor)),
        created_on: Set(Some(now)),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    }
    .insert(db)
    .await?;

    info!(category_id = %model.id, "Created category");
    Ok(model)
}

pub async fn update_category(
    db: &DatabaseConnection,
    payload: UpdateCategory,
    actor: Uuid,
) -> ServiceResult<()> {
    payload.validate()?;
    ensure_category(db, payload.id).await?;

    let mut changes = category::ActiveModel {
        category_name: Set(Some(payload.category_name)),
        category_description: Set(payload.category_description),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(Utc::now())),
        ..Default::default()
    };
    if let Some(is_active) = payload.is_active {
        changes.is_active = Set(is_active);
    }

    let result = CategoryEntity::update_many()
        .set(changes)
        .filter(category::Column::Id.eq(payload.id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    Ok(())
}

/// Flips `isActive`. Asking for the state the category is already in
/// modifies nothing and reports [`ServiceError::WriteFailed`].
pub async fn update_category_status(
    db: &DatabaseConnection,
    payload: UpdateCategoryStatus,
    actor: Uuid,
) -> ServiceResult<()> {
    ensure_category(db, payload.id).await?;
    set_active(db, payload.id, payload.is_active, actor).await
}

pub async fn delete_category(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> ServiceResult<()> {
    ensure_category(db, id).await?;
    set_active(db, id, false, actor).await?;
    info!(category_id = %id, "Soft deleted category");
    Ok(())
}

async fn set_active(
    db: &DatabaseConnection,
    id: Uuid,
    is_active: bool,
    actor: Uuid,
) -> ServiceResult<()> {
    let result = CategoryEntity::update_many()
        .set(category::ActiveModel {
            is_active: Set(is_active),
            modified_by: Set(Some(actor)),
            modified_on: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(category::Column::Id.eq(id))
        .filter(category::Column::IsActive.ne(is_active))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    Ok(())
}
