use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::product::ProductId;

/// Quantities staged per product before "add to cart"
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct PendingQuantities {
    quantities: BTreeMap<ProductId, u32>,
}

impl PendingQuantities {
    /// Every catalog product starts at 1
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            quantities: catalog.products().iter().map(|p| (p.id, 1)).collect(),
        }
    }

    pub fn get(&self, id: ProductId) -> u32 {
        self.quantities.get(&id).copied().unwrap_or(1)
    }

    /// Returns whether the stored value changed. Zero is never stored.
    pub fn set(&mut self, id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.quantities.insert(id, quantity) != Some(quantity)
    }

    pub fn reset(&mut self, id: ProductId) -> bool {
        self.set(id, 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.quantities.iter().map(|(id, qty)| (*id, *qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialized_to_one() {
        let pending = PendingQuantities::for_catalog(&Catalog::standard());
        assert_eq!(pending.iter().count(), 4);
        assert!(pending.iter().all(|(_, qty)| qty == 1));
    }

    #[test]
    fn test_missing_defaults_to_one() {
        let pending = PendingQuantities::default();
        assert_eq!(pending.get(ProductId(3)), 1);
    }

    #[test]
    fn test_set_and_reset() {
        let mut pending = PendingQuantities::for_catalog(&Catalog::standard());
        assert!(pending.set(ProductId(2), 4));
        assert!(!pending.set(ProductId(2), 4));
        assert!(!pending.set(ProductId(2), 0));
        assert_eq!(pending.get(ProductId(2)), 4);
        assert_eq!(pending.get(ProductId(1)), 1);

        assert!(pending.reset(ProductId(2)));
        assert_eq!(pending.get(ProductId(2)), 1);
    }
}
