pub mod cart_item;
pub mod category;
pub mod order;
pub mod order_part;
pub mod product;
pub mod role;
pub mod status;
pub mod user;
pub mod user_role;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::config::AdminSeed;
use crate::identity::{self, IdentityError, NewUser};

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet. Referenced tables go first.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, category::Entity).await?;
    create_table(db, product::Entity).await?;
    create_table(db, cart_item::Entity).await?;
    create_table(db, status::Entity).await?;
    create_table(db, order::Entity).await?;
    create_table(db, order_part::Entity).await?;
    create_table(db, user::Entity).await?;
    create_table(db, role::Entity).await?;
    create_table(db, user_role::Entity).await?;
    Ok(())
}

/// Ensures the default roles and, when configured, the bootstrap administrator.
pub async fn primary_setup(
    db: &DatabaseConnection,
    admin: Option<&AdminSeed>,
) -> Result<(), IdentityError> {
    for (name, description) in role::DEFAULT_ROLES {
        if identity::find_role_by_name(db, name).await?.is_none() {
            identity::create_role(db, name, Some(description.to_owned()), None).await?;
            info!(role = name, "Created default role");
        }
    }

    let Some(admin) = admin else {
        return Ok(());
    };

    if identity::find_by_email(db, &admin.email).await?.is_some() {
        return Ok(());
    }

    let new_admin = NewUser {
        email: admin.email.clone(),
        first_name: "Store".to_owned(),
        last_name: "Administrator".to_owned(),
        address: String::new(),
        created_by: None,
        is_active: true,
    };
    let user = identity::create_user(db, new_admin, &admin.password).await?;
    identity::add_to_role(db, &user, role::ADMIN).await?;
    info!(user_id = %user.id, email = %user.email, "Created bootstrap administrator");

    Ok(())
}
