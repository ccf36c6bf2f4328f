use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::Cart;
use super::catalog::Catalog;
use super::pending::PendingQuantities;
use super::product::{Product, ProductId};
use super::summary::CartSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Product {0} is not in the catalog")]
    UnknownProduct(ProductId),
    #[error("Gift line {0} cannot be edited directly")]
    GiftLineLocked(ProductId),
}

/// One UI event against the cart
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartAction {
    SetPendingQuantity { product_id: ProductId, quantity: i64 },
    IncrementPending { product_id: ProductId },
    DecrementPending { product_id: ProductId },
    AddToCart { product_id: ProductId },
    UpdateCartLine { product_id: ProductId, quantity: i64 },
    IncrementLine { product_id: ProductId },
    DecrementLine { product_id: ProductId },
    RemoveFromCart { product_id: ProductId },
    ReconcileGift,
    DismissGiftBanner { seq: u64 },
}

impl std::fmt::Display for CartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartAction::SetPendingQuantity { product_id, quantity } => {
                write!(f, "set pending quantity of {} to {}", product_id, quantity)
            }
            CartAction::IncrementPending { product_id } => write!(f, "increment pending {}", product_id),
            CartAction::DecrementPending { product_id } => write!(f, "decrement pending {}", product_id),
            CartAction::AddToCart { product_id } => write!(f, "add {} to cart", product_id),
            CartAction::UpdateCartLine { product_id, quantity } => {
                write!(f, "set cart line {} to {}", product_id, quantity)
            }
            CartAction::IncrementLine { product_id } => write!(f, "increment cart line {}", product_id),
            CartAction::DecrementLine { product_id } => write!(f, "decrement cart line {}", product_id),
            CartAction::RemoveFromCart { product_id } => write!(f, "remove {} from cart", product_id),
            CartAction::ReconcileGift => write!(f, "reconcile gift"),
            CartAction::DismissGiftBanner { seq } => write!(f, "dismiss gift banner #{}", seq),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GiftTransition {
    /// NO_GIFT -> GIFT_PRESENT
    Earned { banner_seq: u64 },
    /// GIFT_PRESENT -> NO_GIFT
    Revoked,
}

/// Transient "gift earned" notification
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GiftBanner {
    pub seq: u64,
    pub earned_at: DateTime<Utc>,
}

/// Result of reducing one action
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: CartState,
    pub gift: Option<GiftTransition>,
}

impl Reduction {
    pub fn changed_from(&self, previous: &CartState) -> bool {
        self.state.version != previous.version
    }
}

/// Everything a cart session owns. Values are replaced, never shared.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartState {
    pub cart: Cart,
    pub pending: PendingQuantities,
    pub gift_banner: Option<GiftBanner>,
    /// Bumped once per action that changed anything
    pub version: u64,
    last_banner_seq: u64,
}

fn to_quantity(value: i64) -> Option<u32> {
    if value < 1 {
        None
    } else {
        Some(u32::try_from(value).unwrap_or(u32::MAX))
    }
}

impl CartState {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            cart: Cart::new(),
            pending: PendingQuantities::for_catalog(catalog),
            gift_banner: None,
            version: 0,
            last_banner_seq: 0,
        }
    }

    pub fn summary(&self, catalog: &Catalog) -> CartSummary {
        CartSummary::compute(&self.cart, catalog)
    }

    pub fn banner_visible(&self) -> bool {
        self.gift_banner.is_some()
    }

    /// Apply `action` and reconcile the gift line, producing the next state.
    pub fn reduce(&self, action: &CartAction, catalog: &Catalog) -> Result<Reduction, CartError> {
        let mut next = self.clone();
        let changed = next.apply(action, catalog)?;
        let gift = next.reconcile_gift(catalog);

        if changed || gift.is_some() {
            next.version = self.version + 1;
        }

        Ok(Reduction { state: next, gift })
    }

    fn apply(&mut self, action: &CartAction, catalog: &Catalog) -> Result<bool, CartError> {
        match action {
            CartAction::SetPendingQuantity { product_id, quantity } => {
                require_product(catalog, *product_id)?;
                Ok(match to_quantity(*quantity) {
                    Some(qty) => self.pending.set(*product_id, qty),
                    None => false,
                })
            }
            CartAction::IncrementPending { product_id } => {
                require_product(catalog, *product_id)?;
                let current = self.pending.get(*product_id);
                Ok(self.pending.set(*product_id, current.saturating_add(1)))
            }
            CartAction::DecrementPending { product_id } => {
                require_product(catalog, *product_id)?;
                let current = self.pending.get(*product_id);
                if current <= 1 {
                    return Ok(false);
                }
                Ok(self.pending.set(*product_id, current - 1))
            }
            CartAction::AddToCart { product_id } => {
                let product = require_product(catalog, *product_id)?;
                let quantity = self.pending.get(*product_id);
                self.cart.add(product, quantity);
                self.pending.reset(*product_id);
                Ok(true)
            }
            CartAction::UpdateCartLine { product_id, quantity } => {
                require_editable(catalog, *product_id)?;
                Ok(self.update_line(*product_id, *quantity))
            }
            CartAction::IncrementLine { product_id } => {
                require_editable(catalog, *product_id)?;
                let current = self.cart.line(*product_id).map(|line| line.quantity);
                Ok(match current {
                    Some(quantity) => self.update_line(*product_id, i64::from(quantity) + 1),
                    None => false,
                })
            }
            CartAction::DecrementLine { product_id } => {
                require_editable(catalog, *product_id)?;
                let current = self.cart.line(*product_id).map(|line| line.quantity);
                Ok(match current {
                    Some(quantity) => self.update_line(*product_id, i64::from(quantity) - 1),
                    None => false,
                })
            }
            CartAction::RemoveFromCart { product_id } => {
                require_editable(catalog, *product_id)?;
                Ok(self.cart.remove(*product_id))
            }
            CartAction::ReconcileGift => Ok(false),
            CartAction::DismissGiftBanner { seq } => {
                let current = self.gift_banner.as_ref().is_some_and(|banner| banner.seq == *seq);
                if current {
                    self.gift_banner = None;
                }
                Ok(current)
            }
        }
    }

    fn update_line(&mut self, id: ProductId, quantity: i64) -> bool {
        match to_quantity(quantity) {
            Some(qty) => self.cart.set_quantity(id, qty),
            None => self.cart.remove(id),
        }
    }

    /// Add or drop the gift line so that it is present iff the subtotal
    /// (without the gift) reaches the threshold. No-op when already consistent.
    pub fn reconcile_gift(&mut self, catalog: &Catalog) -> Option<GiftTransition> {
        let gift = catalog.gift();
        let subtotal = self.cart.subtotal_excluding(gift.id);
        let has_gift = self.cart.contains(gift.id);

        if subtotal >= catalog.threshold() && !has_gift {
            self.cart.add(gift, 1);
            self.last_banner_seq += 1;
            self.gift_banner = Some(GiftBanner {
                seq: self.last_banner_seq,
                earned_at: Utc::now(),
            });
            Some(GiftTransition::Earned {
                banner_seq: self.last_banner_seq,
            })
        } else if subtotal < catalog.threshold() && has_gift {
            self.cart.remove(gift.id);
            Some(GiftTransition::Revoked)
        } else {
            None
        }
    }
}

fn require_product(catalog: &Catalog, id: ProductId) -> Result<&Product, CartError> {
    catalog.product(id).ok_or(CartError::UnknownProduct(id))
}

fn require_editable(catalog: &Catalog, id: ProductId) -> Result<(), CartError> {
    if catalog.is_gift(id) {
        return Err(CartError::GiftLineLocked(id));
    }
    Ok(())
}
