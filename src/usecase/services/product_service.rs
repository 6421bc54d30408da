use std::sync::Arc;

use crate::domain::entities::product::{Product, ProductDraft, ProductId};
use crate::usecase::cache::{CatalogCache, FetchError, Observer, QueryData, QueryKey};
use crate::usecase::ports::catalog_api::{ApiError, CatalogApi};

/// What a confirmed mutation changed. `refetch` lists the invalidated keys a
/// view is still showing; those should be refetched in the background.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub product: Option<Product>,
    pub refetch: Vec<QueryKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    Create(ProductDraft),
    Update(ProductId, ProductDraft),
}

pub struct ProductService {
    api: Arc<dyn CatalogApi>,
    cache: CatalogCache,
}

impl ProductService {
    pub fn new(api: Arc<dyn CatalogApi>, cache: CatalogCache) -> Self {
        Self { api, cache }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, FetchError> {
        let data = self.cache.fetch(&QueryKey::Products, || {
            self.api.list_products().map(QueryData::Products)
        })?;
        Ok(into_products(data))
    }

    pub fn cached_products(&self) -> Option<Vec<Product>> {
        self.cache.peek(&QueryKey::Products).map(into_products)
    }

    pub fn get_product(&self, id: ProductId) -> Result<Product, FetchError> {
        let key = QueryKey::Product(id);
        let data = self
            .cache
            .fetch(&key, || self.api.get_product(id).map(QueryData::Product))?;
        into_product(data).ok_or_else(|| FetchError::Remote {
            key: key.to_string(),
            source: ApiError::NotFound,
        })
    }

    pub fn cached_product(&self, id: ProductId) -> Option<Product> {
        self.cache
            .peek(&QueryKey::Product(id))
            .and_then(into_product)
    }

    /// True until the key has been fetched, and again after invalidation.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.cache.is_stale(key)
    }

    pub fn observe(&self, key: QueryKey) -> Observer<QueryKey, QueryData> {
        self.cache.observe(key)
    }

    pub fn submit(&self, request: &SubmitRequest) -> Result<MutationOutcome, ApiError> {
        match request {
            SubmitRequest::Create(draft) => self.create_product(draft),
            SubmitRequest::Update(id, draft) => self.update_product(*id, draft),
        }
    }

    pub fn create_product(&self, draft: &ProductDraft) -> Result<MutationOutcome, ApiError> {
        let created = self.api.create_product(draft).inspect_err(|err| {
            tracing::warn!("create product failed: {err}");
        })?;
        tracing::info!("created product #{} ({})", created.id, created.title);
        let refetch = self.invalidate(&[QueryKey::Products]);
        Ok(MutationOutcome {
            product: Some(created),
            refetch,
        })
    }

    pub fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<MutationOutcome, ApiError> {
        let updated = self.api.update_product(id, draft).inspect_err(|err| {
            tracing::warn!("update product #{id} failed: {err}");
        })?;
        tracing::info!("updated product #{id}");
        let refetch = self.invalidate(&[QueryKey::Products, QueryKey::Product(id)]);
        Ok(MutationOutcome {
            product: Some(updated),
            refetch,
        })
    }

    pub fn delete_product(&self, id: ProductId) -> Result<MutationOutcome, ApiError> {
        self.api.delete_product(id).inspect_err(|err| {
            tracing::warn!("delete product #{id} failed: {err}");
        })?;
        tracing::info!("deleted product #{id}");
        let refetch = self.invalidate(&[QueryKey::Products, QueryKey::Product(id)]);
        Ok(MutationOutcome {
            product: None,
            refetch,
        })
    }

    fn invalidate(&self, keys: &[QueryKey]) -> Vec<QueryKey> {
        keys.iter()
            .copied()
            .filter(|key| self.cache.invalidate(key))
            .collect()
    }
}

fn into_products(data: QueryData) -> Vec<Product> {
    match data {
        QueryData::Products(products) => products,
        QueryData::Product(product) => vec![product],
    }
}

fn into_product(data: QueryData) -> Option<Product> {
    match data {
        QueryData::Product(product) => Some(product),
        QueryData::Products(_) => None,
    }
}
