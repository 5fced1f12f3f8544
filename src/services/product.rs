use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, SelectModel, Selector, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    category,
    product::{self, Entity as ProductEntity, ImageUrls},
};
use crate::error::{Resource, ServiceError, ServiceResult};
use crate::services::category::ensure_category;

/// A product with the name of its category attached. The name is empty when
/// the category row is missing.
#[derive(Clone, Debug, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub image_urls: ImageUrls,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_on: Option<chrono::DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<chrono::DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub category_id: Option<Uuid>,
}

/// Who is changing the catalog. Non-admin editors may only touch products
/// they created.
#[derive(Clone, Copy, Debug)]
pub struct Editor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Editor {
    fn ensure_owns(&self, product: &product::Model) -> ServiceResult<()> {
        if self.is_admin || product.created_by == Some(self.id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

fn with_category(select: Select<ProductEntity>) -> Selector<SelectModel<ProductView>> {
    select
        .join(JoinType::LeftJoin, product::Relation::Category.def())
        .column_as(category::Column::CategoryName, "category_name")
        .order_by_asc(product::Column::CreatedOn)
        .into_model::<ProductView>()
}

pub async fn list_products(db: &DatabaseConnection) -> ServiceResult<Vec<ProductView>> {
    Ok(with_category(ProductEntity::find().filter(product::Column::IsActive.eq(true)))
        .all(db)
        .await?)
}

/// Active products created by `vendor_id`.
pub async fn list_vendor_products(
    db: &DatabaseConnection,
    vendor_id: Uuid,
) -> ServiceResult<Vec<ProductView>> {
    Ok(with_category(
        ProductEntity::find()
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::CreatedBy.eq(vendor_id)),
    )
    .all(db)
    .await?)
}

/// Returns the product whether or not it is active.
pub async fn get_product(db: &DatabaseConnection, id: Uuid) -> ServiceResult<ProductView> {
    with_category(ProductEntity::find_by_id(id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Product))
}

pub async fn create_product(
    db: &DatabaseConnection,
    payload: NewProduct,
    actor: Uuid,
) -> ServiceResult<product::Model> {
    payload.validate()?;
    if let Some(category_id) = payload.category_id {
        ensure_category(db, category_id).await?;
    }
    let now = Utc::now();

    let model = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(Some(payload.name)),
        description: Set(payload.description),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        image_urls: Set(ImageUrls(payload.image_urls)),
        category_id: Set(payload.category_id),
        created_by: Set(Some(actor)),
        created_on: Set(Some(now)),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    }
    .insert(db)
    .await?;

    info!(product_id = %model.id, "Created product");
    Ok(model)
}

pub async fn update_product(
    db: &DatabaseConnection,
    payload: UpdateProduct,
    editor: Editor,
) -> ServiceResult<()> {
    payload.validate()?;
    let existing = ProductEntity::find_by_id(payload.id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Product))?;
    editor.ensure_owns(&existing)?;
    if let Some(category_id) = payload.category_id {
        ensure_category(db, category_id).await?;
    }

    let result = ProductEntity::update_many()
        .set(product::ActiveModel {
            name: Set(Some(payload.name)),
            description: Set(payload.description),
            price: Set(payload.price),
            quantity: Set(payload.quantity),
            image_urls: Set(ImageUrls(payload.image_urls)),
            category_id: Set(payload.category_id),
            modified_by: Set(Some(editor.id)),
            modified_on: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(product::Column::Id.eq(payload.id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    Ok(())
}

/// Soft delete. A product that is already inactive reports
/// [`ServiceError::WriteFailed`].
pub async fn delete_product(
    db: &DatabaseConnection,
    id: Uuid,
    editor: Editor,
) -> ServiceResult<()> {
    let existing = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Product))?;
    editor.ensure_owns(&existing)?;

    let result = ProductEntity::update_many()
        .set(product::ActiveModel {
            is_active: Set(false),
            modified_by: Set(Some(editor.id)),
            modified_on: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::IsActive.eq(true))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    info!(product_id = %id, "Soft deleted product");
    Ok(())
}
