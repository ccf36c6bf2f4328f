use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    models::{
        CartAction, CartError, CartState, CartSummary, Catalog, CatalogError, GiftTransition,
        ProductId,
    },
    utils::Config,
};

#[derive(Error, Debug)]
pub enum CartServiceError {
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Batch failed: all {total_count} actions were rejected")]
    BatchFailed { total_count: usize },
}

/// Outcome of applying a list of actions in order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub applied: usize,
    pub unchanged: usize,
    pub failures: Vec<(usize, CartAction, CartError)>,
}

/// Owns the session's cart state and publishes every new version to subscribers.
pub struct CartService {
    catalog: Arc<Catalog>,
    state: Arc<watch::Sender<CartState>>,
    banner_delay: Duration,
}

impl CartService {
    pub fn new(catalog: Catalog, banner_delay: Duration) -> Self {
        let (state, _) = watch::channel(CartState::new(&catalog));
        Self {
            catalog: Arc::new(catalog),
            state: Arc::new(state),
            banner_delay,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, CartServiceError> {
        let catalog = Catalog::standard().with_threshold(config.gift_threshold)?;
        info!(
            "Cart session started: {} products, gift threshold {}",
            catalog.products().len(),
            catalog.threshold()
        );
        Ok(Self::new(catalog, config.banner_delay()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn summary(&self) -> CartSummary {
        self.state.borrow().summary(&self.catalog)
    }

    /// Receiver that observes every committed state version
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    pub fn set_pending_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::SetPendingQuantity { product_id, quantity })
    }

    pub fn increment_pending(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::IncrementPending { product_id })
    }

    pub fn decrement_pending(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::DecrementPending { product_id })
    }

    pub fn add_to_cart(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::AddToCart { product_id })
    }

    pub fn update_cart_line(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::UpdateCartLine { product_id, quantity })
    }

    pub fn increment_line(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::IncrementLine { product_id })
    }

    pub fn decrement_line(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::DecrementLine { product_id })
    }

    pub fn remove_from_cart(&self, product_id: ProductId) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::RemoveFromCart { product_id })
    }

    pub fn reconcile_gift(&self) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::ReconcileGift)
    }

    pub fn dismiss_gift_banner(&self, seq: u64) -> Result<CartSummary, CartServiceError> {
        self.dispatch(CartAction::DismissGiftBanner { seq })
    }

    /// Reduce one action against the current state and publish the result
    pub fn dispatch(&self, action: CartAction) -> Result<CartSummary, CartServiceError> {
        debug!("Dispatching action: {}", action);

        let (changed, gift) = commit(&self.state, &self.catalog, &action).map_err(|e| {
            warn!("Rejected action '{}': {}", action, e);
            CartServiceError::Cart(e)
        })?;

        if !changed {
            debug!("Action '{}' left the cart unchanged", action);
        }

        match gift {
            Some(GiftTransition::Earned { banner_seq }) => {
                info!("Free {} unlocked", self.catalog.gift().name);
                self.schedule_banner_clear(banner_seq);
            }
            Some(GiftTransition::Revoked) => {
                info!("Free {} removed: subtotal fell below threshold", self.catalog.gift().name);
            }
            None => {}
        }

        Ok(self.summary())
    }

    /// Apply actions in order, continuing past rejected ones
    pub fn dispatch_all(&self, actions: Vec<CartAction>) -> Result<BatchReport, CartServiceError> {
        info!("Applying {} cart actions", actions.len());

        let total_count = actions.len();
        let mut report = BatchReport::default();

        for (index, action) in actions.into_iter().enumerate() {
            let before = self.state.borrow().version;
            match self.dispatch(action.clone()) {
                Ok(_) => {
                    if self.state.borrow().version == before {
                        report.unchanged += 1;
                    } else {
                        report.applied += 1;
                    }
                }
                Err(CartServiceError::Cart(e)) => report.failures.push((index, action, e)),
                Err(other) => return Err(other),
            }
        }

        if total_count > 0 && report.failures.len() == total_count {
            error!("All {} cart actions were rejected", total_count);
            return Err(CartServiceError::BatchFailed { total_count });
        }

        if !report.failures.is_empty() {
            warn!(
                "Batch partially failed: {}/{} actions rejected",
                report.failures.len(),
                total_count
            );
        }

        Ok(report)
    }

    fn schedule_banner_clear(&self, seq: u64) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available; gift banner #{} stays until dismissed", seq);
                return;
            }
        };

        let state = Arc::clone(&self.state);
        let catalog = Arc::clone(&self.catalog);
        let delay = self.banner_delay;

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            match commit(&state, &catalog, &CartAction::DismissGiftBanner { seq }) {
                Ok((true, _)) => debug!("Gift banner #{} cleared", seq),
                Ok((false, _)) => debug!("Gift banner #{} already gone", seq),
                Err(e) => error!("Failed to clear gift banner #{}: {}", seq, e),
            }
        });
    }
}

fn commit(
    state: &watch::Sender<CartState>,
    catalog: &Catalog,
    action: &CartAction,
) -> Result<(bool, Option<GiftTransition>), CartError> {
    let mut outcome = Ok(None);

    let changed = state.send_if_modified(|current| match current.reduce(action, catalog) {
        Ok(reduction) => {
            let changed = reduction.changed_from(current);
            outcome = Ok(reduction.gift);
            if changed {
                *current = reduction.state;
            }
            changed
        }
        Err(e) => {
            outcome = Err(e);
            false
        }
    });

    outcome.map(|gift| (changed, gift))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_without_runtime_stays_visible() {
        let service = CartService::new(Catalog::standard(), Duration::from_secs(3));
        service.set_pending_quantity(ProductId(1), 2).unwrap();
        let summary = service.add_to_cart(ProductId(1)).unwrap();

        assert!(summary.gift_present);
        let banner = service.snapshot().gift_banner.expect("banner raised");

        service.dismiss_gift_banner(banner.seq).unwrap();
        assert!(!service.snapshot().banner_visible());
    }

    #[test]
    fn test_from_config_applies_threshold() {
        let config = Config {
            gift_threshold: 300,
            ..Config::default()
        };
        let service = CartService::from_config(&config).unwrap();
        assert_eq!(service.catalog().threshold(), 300);

        let summary = service.add_to_cart(ProductId(2)).unwrap();
        assert!(summary.gift_present);
    }
}
