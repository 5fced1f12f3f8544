//! Workflow operations. Each function performs one request's worth of reads
//! and writes and reports expected outcomes through [`ServiceError`].
//!
//! [`ServiceError`]: crate::error::ServiceError

pub mod authentication;
pub mod category;
pub mod order;
pub mod product;
