use std::collections::HashSet;

use gift_cart::models::{CartAction, CartState, Catalog, ProductId};

const GIFT: ProductId = ProductId(99);

fn alphabet() -> Vec<CartAction> {
    let mut actions = Vec::new();
    for id in [1, 2, 3] {
        let product_id = ProductId(id);
        actions.push(CartAction::AddToCart { product_id });
        actions.push(CartAction::SetPendingQuantity { product_id, quantity: 2 });
        actions.push(CartAction::DecrementLine { product_id });
        actions.push(CartAction::UpdateCartLine { product_id, quantity: 0 });
    }
    actions.push(CartAction::IncrementLine { product_id: ProductId(1) });
    actions.push(CartAction::ReconcileGift);
    actions
}

fn assert_invariants(state: &CartState, catalog: &Catalog) {
    let summary = state.summary(catalog);

    let expected: u64 = state
        .cart
        .lines()
        .iter()
        .filter(|l| l.id != GIFT)
        .map(|l| l.unit_price * u64::from(l.quantity))
        .sum();
    assert_eq!(summary.subtotal, expected);

    assert_eq!(state.cart.contains(GIFT), summary.subtotal >= catalog.threshold());
    assert!(state.cart.lines().iter().all(|l| l.quantity >= 1));

    let ids: HashSet<_> = state.cart.lines().iter().map(|l| l.id).collect();
    assert_eq!(ids.len(), state.cart.len());

    if let Some(gift) = state.cart.line(GIFT) {
        assert_eq!(gift.quantity, 1);
    }
}

/// Walk every action sequence of length `depth`, checking after each step
fn walk(state: &CartState, catalog: &Catalog, actions: &[CartAction], depth: usize) {
    if depth == 0 {
        return;
    }
    for action in actions {
        let reduction = state.reduce(action, catalog).unwrap();
        assert_invariants(&reduction.state, catalog);

        let again = reduction.state.reduce(&CartAction::ReconcileGift, catalog).unwrap();
        assert_eq!(again.state, reduction.state);
        assert!(again.gift.is_none());

        walk(&reduction.state, catalog, actions, depth - 1);
    }
}

#[test]
fn test_invariants_hold_after_every_action() {
    let catalog = Catalog::standard();
    walk(&CartState::new(&catalog), &catalog, &alphabet(), 4);
}

#[test]
fn test_invariants_with_low_threshold() {
    let catalog = Catalog::standard().with_threshold(300).unwrap();
    walk(&CartState::new(&catalog), &catalog, &alphabet(), 3);
}

#[test]
fn test_quantities_sum_across_adds() {
    let catalog = Catalog::standard();
    let mut state = CartState::new(&catalog);
    let plan = [(2, 3), (3, 1), (2, 4), (3, 2), (2, 1)];

    for (id, quantity) in plan {
        let product_id = ProductId(id);
        state = state
            .reduce(&CartAction::SetPendingQuantity { product_id, quantity }, &catalog)
            .unwrap()
            .state;
        state = state.reduce(&CartAction::AddToCart { product_id }, &catalog).unwrap().state;
        assert_invariants(&state, &catalog);
    }

    assert_eq!(state.cart.line(ProductId(2)).map(|l| l.quantity), Some(8));
    assert_eq!(state.cart.line(ProductId(3)).map(|l| l.quantity), Some(3));
}
