//! Catch-all for unmatched paths and unsupported methods

use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}
