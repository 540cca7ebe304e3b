//! Product catalog browsing and administration.
//!
//! Reads are cached for five minutes (the catalog changes rarely and the
//! home page re-requests it on every visit); every admin write invalidates
//! the cache so the next read observes it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use velvet_mango_core::ProductId;

use crate::backend::{BackendError, CatalogGateway, NewProduct, Product};

/// Cache key for the full product list; the catalog is small enough to
/// cache as one entry.
const PRODUCTS_KEY: &str = "products";

/// Catalog reads and admin writes over a [`CatalogGateway`].
pub struct CatalogService<C> {
    backend: C,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl<C: CatalogGateway> CatalogService<C> {
    /// Create a catalog service over a gateway.
    #[must_use]
    pub fn new(backend: C) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { backend, cache }
    }

    /// All products, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the cache is cold and the fetch fails;
    /// errors are not cached.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.cache.get(PRODUCTS_KEY).await {
            debug!("Product cache hit");
            return Ok(products);
        }

        let products = Arc::new(self.backend.list_products().await?);
        self.cache.insert(PRODUCTS_KEY, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Insert a product and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the write is rejected.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let created = self.backend.create_product(product).await?;
        self.invalidate().await;
        Ok(created)
    }

    /// Replace a product's fields and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the write is rejected or the id
    /// matches no row.
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let updated = self.backend.update_product(id, product).await?;
        self.invalidate().await;
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the delete is rejected.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.backend.delete_product(id).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Drop the cached product list.
    pub async fn invalidate(&self) {
        self.cache.invalidate(PRODUCTS_KEY).await;
    }
}

/// Distinct category labels in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(product.category.as_str());
        }
    }
    seen
}

/// Products carrying the given category label.
pub fn in_category<'a>(
    products: &'a [Product],
    category: &'a str,
) -> impl Iterator<Item = &'a Product> {
    products.iter().filter(move |p| p.category == category)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use velvet_mango_core::Price;

    fn product(name: &str, category: &str) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            description: String::new(),
            price: Price::new(Decimal::from(500)),
            image_url: None,
            category: category.to_string(),
            stock: 1,
            created_at: None,
        }
    }

    /// Gateway stub that counts list fetches.
    struct StubCatalog {
        products: Vec<Product>,
        fetches: AtomicUsize,
    }

    impl StubCatalog {
        fn new(products: Vec<Product>) -> Self {
            Self {
                products,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl CatalogGateway for StubCatalog {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.clone())
        }

        async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
            Ok(Product {
                id: ProductId::generate(),
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                category: product.category.clone(),
                stock: product.stock,
                created_at: None,
            })
        }

        async fn update_product(
            &self,
            id: ProductId,
            product: &NewProduct,
        ) -> Result<Product, BackendError> {
            Ok(Product {
                id,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                category: product.category.clone(),
                stock: product.stock,
                created_at: None,
            })
        }

        async fn delete_product(&self, _id: ProductId) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: Price::new(Decimal::from(500)),
            image_url: None,
            category: "tshirts".to_string(),
            stock: 1,
        }
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let service = CatalogService::new(StubCatalog::new(vec![product("Tee", "tshirts")]));

        let first = service.products().await.unwrap();
        let second = service.products().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(service.backend.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_writes_invalidate_cache() {
        let service = CatalogService::new(StubCatalog::new(vec![product("Tee", "tshirts")]));

        service.products().await.unwrap();
        service.create_product(&new_product("Hoodie")).await.unwrap();
        service.products().await.unwrap();

        assert_eq!(service.backend.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let service = CatalogService::new(StubCatalog::new(vec![product("Tee", "tshirts")]));

        service.products().await.unwrap();
        service.delete_product(ProductId::generate()).await.unwrap();
        service.products().await.unwrap();

        assert_eq!(service.backend.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_categories_distinct_first_seen_order() {
        let products = vec![
            product("Tee", "tshirts"),
            product("Hoodie", "hoodies"),
            product("Tee 2", "tshirts"),
            product("Cap", "accessories"),
        ];

        assert_eq!(
            categories(&products),
            vec!["tshirts", "hoodies", "accessories"]
        );
    }

    #[test]
    fn test_in_category() {
        let products = vec![
            product("Tee", "tshirts"),
            product("Hoodie", "hoodies"),
            product("Tee 2", "tshirts"),
        ];

        let names: Vec<_> = in_category(&products, "tshirts")
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tee", "Tee 2"]);
        assert_eq!(in_category(&products, "none").count(), 0);
    }
}
