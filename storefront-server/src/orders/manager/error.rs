use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::StorageError;
use crate::db::models::OrderStatus;
use crate::utils::AppError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid order: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order cannot be cancelled in status {0}")]
    NotCancelable(OrderStatus),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Order already paid: {0}")]
    AlreadyPaid(String),

    #[error("Provider order already linked: {0}")]
    ProviderOrderTaken(String),

    #[error("Payment not accepted: {0}")]
    PaymentRejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<CatalogError> for ManagerError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => ManagerError::ProductNotFound(id),
            CatalogError::InsufficientStock {
                product_id,
                requested,
                available,
            } => ManagerError::OutOfStock {
                product_id,
                requested,
                available,
            },
            CatalogError::AlreadyReviewed(id) => {
                ManagerError::Internal(format!("unexpected review conflict on {id}"))
            }
            CatalogError::Storage(e) => ManagerError::Storage(e),
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => AppError::database(e.to_string()),
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::OrderNotFound(id) => AppError::not_found(format!("Order {id} not found")),
            ManagerError::ProductNotFound(id) => {
                AppError::not_found(format!("Product {id} not found"))
            }
            e @ ManagerError::OutOfStock { .. } => AppError::OutOfStock(e.to_string()),
            ManagerError::InvalidTransition { from, to } => {
                AppError::InvalidTransition(format!("Cannot change status from {from} to {to}"))
            }
            ManagerError::NotCancelable(status) => {
                AppError::NotCancelable(format!("Order is {status}"))
            }
            ManagerError::Forbidden(msg) => AppError::forbidden(msg),
            ManagerError::AlreadyPaid(id) => {
                AppError::conflict(format!("Order {id} has already been paid"))
            }
            ManagerError::ProviderOrderTaken(id) => AppError::conflict(format!(
                "Provider order {id} is already linked to another order"
            )),
            ManagerError::PaymentRejected(msg) => AppError::BusinessRule(msg),
            ManagerError::Internal(msg) => AppError::internal(msg),
        }
    }
}
