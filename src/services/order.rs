use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, SelectModel, Selector, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    cart_item::{self, Entity as CartItemEntity},
    order::{self, Entity as OrderEntity},
    order_part::{self, Entity as OrderPartEntity},
    product::{self, Entity as ProductEntity, ImageUrls},
    status::{self, Entity as StatusEntity},
};
use crate::error::{Resource, ServiceError, ServiceResult};

/// A cart row enriched with the product's current name, price and images.
#[derive(Clone, Debug, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product_name: Option<String>,
    pub price: Option<f64>,
    pub image_urls: ImageUrls,
    pub created_on: Option<chrono::DateTime<Utc>>,
    pub is_active: bool,
}

/// One line of an order, frozen at creation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

impl From<order_part::Model> for OrderLine {
    fn from(value: order_part::Model) -> Self {
        OrderLine {
            product_id: value.product_id,
            name: value.name,
            quantity: value.quantity,
            price: value.price,
        }
    }
}

#[derive(Clone, Debug, FromQueryResult)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    item_count: Option<i32>,
    total_price: f64,
    current_status_id: Uuid,
    created_by: Option<Uuid>,
    created_on: Option<chrono::DateTime<Utc>>,
    modified_by: Option<Uuid>,
    modified_on: Option<chrono::DateTime<Utc>>,
    is_active: bool,
    status: Option<String>,
    status_description: Option<String>,
}

/// An order with its lines and the name of its current status.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub item_count: Option<i32>,
    pub products: Vec<OrderLine>,
    pub total_price: f64,
    pub current_status_id: Uuid,
    pub status: Option<String>,
    pub status_description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_on: Option<chrono::DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub modified_on: Option<chrono::DateTime<Utc>>,
    pub is_active: bool,
}

impl OrderView {
    fn new(row: OrderRow, products: Vec<OrderLine>) -> OrderView {
        OrderView {
            id: row.id,
            customer_id: row.customer_id,
            item_count: row.item_count,
            products,
            total_price: row.total_price,
            current_status_id: row.current_status_id,
            status: row.status,
            status_description: row.status_description,
            created_by: row.created_by,
            created_on: row.created_on,
            modified_by: row.modified_by,
            modified_on: row.modified_on,
            is_active: row.is_active,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub customer_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStatus {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: Uuid,
    #[validate(range(min = 1))]
    pub item_count: Option<i32>,
    #[validate(length(min = 1), nested)]
    pub products: Vec<OrderLine>,
    #[validate(range(min = 0.0))]
    pub total_price: Option<f64>,
}

// Cart

pub async fn cart_items(
    db: &DatabaseConnection,
    customer_id: Uuid,
) -> ServiceResult<Vec<CartItemView>> {
    Ok(CartItemEntity::find()
        .filter(cart_item::Column::CustomerId.eq(customer_id))
        .filter(cart_item::Column::IsActive.eq(true))
        .join(JoinType::InnerJoin, cart_item::Relation::Product.def())
        .column_as(product::Column::Name, "product_name")
        .column_as(product::Column::Price, "price")
        .column_as(product::Column::ImageUrls, "image_urls")
        .order_by_asc(cart_item::Column::CreatedOn)
        .into_model::<CartItemView>()
        .all(db)
        .await?)
}

/// Always inserts a new row, even when the customer already has the same
/// product in the cart.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    payload: NewCartItem,
    actor: Uuid,
) -> ServiceResult<cart_item::Model> {
    payload.validate()?;
    ProductEntity::find_by_id(payload.product_id)
        .filter(product::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Product))?;
    let now = Utc::now();

    let model = cart_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(payload.customer_id),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        created_by: Set(Some(actor)),
        created_on: Set(Some(now)),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Soft deletes a cart row. The row must belong to `customer_id`.
pub async fn remove_from_cart(
    db: &DatabaseConnection,
    customer_id: Uuid,
    cart_item_id: Uuid,
    actor: Uuid,
) -> ServiceResult<()> {
    CartItemEntity::find_by_id(cart_item_id)
        .filter(cart_item::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::CartItem))?;

    let result = CartItemEntity::update_many()
        .set(cart_item::ActiveModel {
            is_active: Set(false),
            modified_by: Set(Some(actor)),
            modified_on: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(cart_item::Column::Id.eq(cart_item_id))
        .filter(cart_item::Column::CustomerId.eq(customer_id))
        .filter(cart_item::Column::IsActive.eq(true))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    Ok(())
}

// Statuses

pub async fn create_status(
    db: &DatabaseConnection,
    payload: NewStatus,
    actor: Uuid,
) -> ServiceResult<status::Model> {
    payload.validate()?;
    let name = payload.name.trim().to_owned();

    let existing = StatusEntity::find()
        .filter(status::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(Resource::Status));
    }
    let now = Utc::now();

    let model = status::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        created_by: Set(Some(actor)),
        created_on: Set(Some(now)),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    }
    .insert(db)
    .await?;

    info!(status = %model.name, "Created order status");
    Ok(model)
}

pub async fn active_statuses(db: &DatabaseConnection) -> ServiceResult<Vec<status::Model>> {
    Ok(StatusEntity::find()
        .filter(status::Column::IsActive.eq(true))
        .order_by_asc(status::Column::CreatedOn)
        .all(db)
        .await?)
}

// Orders

fn with_status(select: Select<OrderEntity>) -> Selector<SelectModel<OrderRow>> {
    select
        .join(JoinType::LeftJoin, order::Relation::Status.def())
        .column_as(status::Column::Name, "status")
        .column_as(status::Column::Description, "status_description")
        .order_by_asc(order::Column::CreatedOn)
        .into_model::<OrderRow>()
}

async fn lines_for(
    db: &DatabaseConnection,
    order_ids: Vec<Uuid>,
) -> ServiceResult<HashMap<Uuid, Vec<OrderLine>>> {
    let parts = OrderPartEntity::find()
        .filter(order_part::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_part::Column::LineNo)
        .all(db)
        .await?;

    let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for part in parts {
        lines.entry(part.order_id).or_default().push(part.into());
    }
    Ok(lines)
}

/// Creates an order in the "Processing" status. The order row and its lines
/// are written in one transaction. The cart is left untouched.
pub async fn create_order(
    db: &DatabaseConnection,
    payload: NewOrder,
    actor: Uuid,
) -> ServiceResult<OrderView> {
    payload.validate()?;

    let processing = StatusEntity::find()
        .filter(status::Column::Name.eq(status::PROCESSING))
        .filter(status::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("No active {} status, refusing to create order", status::PROCESSING);
            ServiceError::NotFound(Resource::Status)
        })?;

    let item_count = payload
        .item_count
        .unwrap_or(payload.products.len() as i32);
    let total_price = payload.total_price.unwrap_or_else(|| {
        payload
            .products
            .iter()
            .map(|line| line.price * f64::from(line.quantity))
            .sum()
    });
    let order_id = Uuid::new_v4();
    let now = Utc::now();

    let txn = db.begin().await?;

    order::ActiveModel {
        id: Set(order_id),
        customer_id: Set(payload.customer_id),
        item_count: Set(Some(item_count)),
        total_price: Set(total_price),
        current_status_id: Set(processing.id),
        created_by: Set(Some(actor)),
        created_on: Set(Some(now)),
        modified_by: Set(Some(actor)),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    }
    .insert(&txn)
    .await?;

    let parts = payload
        .products
        .iter()
        .enumerate()
        .map(|(position, line)| order_part::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            line_no: Set(position as i32),
            product_id: Set(line.product_id),
            name: Set(line.name.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
        });
    OrderPartEntity::insert_many(parts)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    info!(order_id = %order_id, customer_id = %payload.customer_id, "Created order");

    Ok(OrderView {
        id: order_id,
        customer_id: payload.customer_id,
        item_count: Some(item_count),
        products: payload.products,
        total_price,
        current_status_id: processing.id,
        status: Some(processing.name),
        status_description: processing.description,
        created_by: Some(actor),
        created_on: Some(now),
        modified_by: Some(actor),
        modified_on: Some(now),
        is_active: true,
    })
}

/// Active orders of a customer with their current status.
pub async fn customer_orders(
    db: &DatabaseConnection,
    customer_id: Uuid,
) -> ServiceResult<Vec<OrderView>> {
    let rows = with_status(
        OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::IsActive.eq(true)),
    )
    .all(db)
    .await?;

    let mut lines = lines_for(db, rows.iter().map(|row| row.id).collect()).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let products = lines.remove(&row.id).unwrap_or_default();
            OrderView::new(row, products)
        })
        .collect())
}

/// Returns the order whether or not it has been cancelled.
pub async fn get_order(db: &DatabaseConnection, order_id: Uuid) -> ServiceResult<OrderView> {
    let row = with_status(OrderEntity::find_by_id(order_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Order))?;

    let mut lines = lines_for(db, vec![row.id]).await?;
    let products = lines.remove(&row.id).unwrap_or_default();
    Ok(OrderView::new(row, products))
}

/// Soft deletes an order owned by `customer_id`.
pub async fn cancel_order(
    db: &DatabaseConnection,
    customer_id: Uuid,
    order_id: Uuid,
    actor: Uuid,
) -> ServiceResult<()> {
    OrderEntity::find_by_id(order_id)
        .filter(order::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Order))?;

    let result = OrderEntity::update_many()
        .set(order::ActiveModel {
            is_active: Set(false),
            modified_by: Set(Some(actor)),
            modified_on: Set(Some(Utc::now())),
            ..Default::default()
        })
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::CustomerId.eq(customer_id))
        .filter(order::Column::IsActive.eq(true))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::WriteFailed);
    }
    info!(order_id = %order_id, "Cancelled order");
    Ok(())
}
