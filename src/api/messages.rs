//! Message codes carried in the `message` field of every response envelope.

pub const SUCCESS: &str = "Success";
pub const ERROR: &str = "Error";

pub const INTERNAL_SERVER_ERROR: &str = "server-Error.";
pub const VALIDATION_FAILED: &str = "validation-failed";
pub const UNAUTHORIZED: &str = "unauthorized";
pub const ACCESS_DENIED: &str = "access-denied";
pub const ALREADY_EXISTS: &str = "resource-already-exist";

// Products
pub const PRODUCTS_RETRIEVAL_SUCCESS: &str = "products-retrieval-success";
pub const PRODUCT_RETRIEVAL_SUCCESS: &str = "product-retrieval-success";
pub const PRODUCT_CREATION_SUCCESS: &str = "product-creation-success";
pub const PRODUCT_CREATION_FAILED: &str = "product-creation-failed";
pub const PRODUCT_UPDATE_SUCCESS: &str = "product-update-success";
pub const PRODUCT_UPDATE_FAILED: &str = "product-update-failed";
pub const PRODUCT_REMOVE_SUCCESS: &str = "product-remove-success";
pub const PRODUCT_REMOVE_FAILED: &str = "product-remove-failed";
pub const PRODUCT_NOT_EXIST: &str = "product-not-exist";

// Categories
pub const CATEGORIES_RETRIEVAL_SUCCESS: &str = "Categories-retrieval-success";
pub const CATEGORY_RETRIEVAL_SUCCESS: &str = "Category-retrieval-success";
pub const CATEGORY_CREATION_SUCCESS: &str = "Category-creation-success";
pub const CATEGORY_UPDATE_SUCCESS: &str = "Category-update-success";
pub const CATEGORY_UPDATE_FAILED: &str = "Category-update-failed";
pub const CATEGORY_STATUS_UPDATE_SUCCESS: &str = "Category-status-update-success";
pub const CATEGORY_STATUS_UPDATE_FAILED: &str = "Category-status-update-failed";
pub const CATEGORY_REMOVE_SUCCESS: &str = "Category-remove-success";
pub const CATEGORY_REMOVE_FAILED: &str = "Category-remove-failed";
pub const CATEGORY_NOT_EXIST: &str = "Category-not-exist";

// Identity
pub const ROLES_RETRIEVAL_SUCCESS: &str = "Roles-retrieval-success";
pub const ROLE_CREATION_SUCCESS: &str = "Role-creation-success";
pub const ROLE_CREATION_FAILED: &str = "Role-creation-failed";
pub const ROLE_ALREADY_EXIST: &str = "Role-already-exist";
pub const ROLE_NOT_EXIST: &str = "Role-not-exist";
pub const USER_ALREADY_EXIST: &str = "User-already-exist";
pub const USER_NOT_EXIST: &str = "User-not-exist";
pub const USERS_BY_ROLE_RETRIEVAL_SUCCESS: &str = "Users-by-role-retrieval-success";
pub const USERS_BY_ROLE_NOT_FOUND: &str = "Users-by-this-role-not-found";
pub const USER_CREATION_SUCCESS: &str = "User-creation-success";
pub const USER_CREATION_FAILED: &str = "User-creation-failed";
pub const USER_UPDATE_SUCCESS: &str = "User-update-success";
pub const USER_UPDATE_FAILED: &str = "User-update-failed";
pub const USER_LOGIN_SUCCESS: &str = "User-login-success";
pub const INVALID_CREDENTIALS: &str = "invalid-email/password.";
pub const USER_DETAILS_RETRIEVAL_SUCCESS: &str = "User-details-retrieval-success";

// Cart and orders
pub const CART_ITEMS_RETRIEVAL_SUCCESS: &str = "Cart-items-retrieval-success";
pub const CART_ITEM_NOT_FOUND: &str = "Cart-item-not-found";
pub const CART_ITEM_REMOVAL_SUCCESS: &str = "Cart-item-removal-success";
pub const CART_ITEM_REMOVAL_FAILED: &str = "Cart-item-removal-failed";
pub const ADD_ITEM_TO_CART_SUCCESS: &str = "add-item-to-cart-success";
pub const STATUS_CREATION_SUCCESS: &str = "Status-creation-success";
pub const STATUS_ALREADY_EXIST: &str = "Status-already-exist";
pub const STATUS_RETRIEVAL_SUCCESS: &str = "Status-retrieval-success";
pub const STATUSES_NOT_FOUND: &str = "Statuses-not-found";
pub const ORDER_CREATION_SUCCESS: &str = "Order-creation-success";
pub const ORDER_CREATION_FAILED: &str = "Order-creation-failed";
pub const ORDER_RETRIEVAL_SUCCESS: &str = "Order-retrieval-success";
pub const ORDER_NOT_FOUND: &str = "Order-not-found";
pub const ORDER_CANCEL_SUCCESS: &str = "Order-cancel-success";
pub const ORDER_CANCEL_FAILED: &str = "Order-cancel-failed";
