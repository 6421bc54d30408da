use crate::domain::entities::product::{Credentials, Product, ProductDraft, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

/// Remote product catalog and auth endpoints.
pub trait CatalogApi: Send + Sync {
    fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    fn get_product(&self, id: ProductId) -> Result<Product, ApiError>;
    fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError>;
    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, ApiError>;
    fn delete_product(&self, id: ProductId) -> Result<(), ApiError>;
    fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;
}
