use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::{Product, ProductId};

pub const GIFT_PRODUCT_ID: ProductId = ProductId(99);
pub const DEFAULT_GIFT_THRESHOLD: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),
    #[error("Gift id {0} collides with a catalog product")]
    GiftIdCollision(ProductId),
    #[error("Gift item must be free, got price {0}")]
    GiftNotFree(u64),
    #[error("Gift threshold must be greater than zero")]
    ZeroThreshold,
}

/// Fixed set of purchasable products plus the promotional gift
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    gift: Product,
    threshold: u64,
}

impl Catalog {
    pub fn new(products: Vec<Product>, gift: Product, threshold: u64) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
        }

        if seen.contains(&gift.id) {
            return Err(CatalogError::GiftIdCollision(gift.id));
        }

        if gift.price != 0 {
            return Err(CatalogError::GiftNotFree(gift.price));
        }

        if threshold == 0 {
            return Err(CatalogError::ZeroThreshold);
        }

        Ok(Self {
            products,
            gift,
            threshold,
        })
    }

    /// The built-in storefront
    pub fn standard() -> Self {
        Self {
            products: vec![
                Product::new(1, "Laptop", 500),
                Product::new(2, "Smartphone", 300),
                Product::new(3, "Headphones", 100),
                Product::new(4, "Smartwatch", 150),
            ],
            gift: Product::new(GIFT_PRODUCT_ID.0, "Wireless Mouse", 0),
            threshold: DEFAULT_GIFT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u64) -> Result<Self, CatalogError> {
        if threshold == 0 {
            return Err(CatalogError::ZeroThreshold);
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Purchasable product by id. The gift is never returned here.
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn gift(&self) -> &Product {
        &self.gift
    }

    pub fn is_gift(&self, id: ProductId) -> bool {
        self.gift.id == id
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::standard()
    }
}
