use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::catalog::Catalog;

/// Values derived from the cart; never stored alongside it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartSummary {
    pub subtotal: u64,
    pub threshold: u64,
    /// min(subtotal / threshold, 1)
    pub progress: f64,
    pub amount_remaining: u64,
    pub gift_eligible: bool,
    pub gift_present: bool,
    pub line_count: usize,
}

impl CartSummary {
    pub fn compute(cart: &Cart, catalog: &Catalog) -> Self {
        let gift_id = catalog.gift().id;
        let subtotal = cart.subtotal_excluding(gift_id);
        let threshold = catalog.threshold();

        let progress = if threshold == 0 {
            1.0
        } else {
            (subtotal as f64 / threshold as f64).min(1.0)
        };

        Self {
            subtotal,
            threshold,
            progress,
            amount_remaining: threshold.saturating_sub(subtotal),
            gift_eligible: subtotal >= threshold,
            gift_present: cart.contains(gift_id),
            line_count: cart.len(),
        }
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ProductId;

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::compute(&Cart::new(), &Catalog::standard());
        assert_eq!(summary.subtotal, 0);
        assert_eq!(summary.progress_percent(), 0.0);
        assert_eq!(summary.amount_remaining, 1000);
        assert!(!summary.gift_eligible);
        assert!(!summary.gift_present);
    }

    #[test]
    fn test_progress_is_capped() {
        let catalog = Catalog::standard();
        let mut cart = Cart::new();
        cart.add(catalog.product(ProductId(1)).unwrap(), 3);

        let summary = CartSummary::compute(&cart, &catalog);
        assert_eq!(summary.subtotal, 1500);
        assert_eq!(summary.progress, 1.0);
        assert_eq!(summary.amount_remaining, 0);
        assert!(summary.gift_eligible);
    }

    #[test]
    fn test_partial_progress() {
        let catalog = Catalog::standard();
        let mut cart = Cart::new();
        cart.add(catalog.product(ProductId(4)).unwrap(), 1);

        let summary = CartSummary::compute(&cart, &catalog);
        assert_eq!(summary.subtotal, 150);
        assert!((summary.progress_percent() - 15.0).abs() < 1e-9);
        assert_eq!(summary.amount_remaining, 850);
    }
}
