use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub unit_price: u64,
    /// Always >= 1; a line that would drop below that is removed instead
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.max(1),
        }
    }

    pub fn total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// Ordered cart lines, unique by product id
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.line(id).is_some()
    }

    /// Grow an existing line or append a new one at the end
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.lines.iter_mut().find(|line| line.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::new(product, quantity)),
        }
    }

    /// Overwrite a line's quantity; zero removes the line. Returns whether anything changed.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(id);
        }

        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    /// Sum of line totals, skipping the line with `excluded` id
    pub fn subtotal_excluding(&self, excluded: ProductId) -> u64 {
        self.lines
            .iter()
            .filter(|line| line.id != excluded)
            .fold(0u64, |total, line| total.saturating_add(line.total()))
    }
}
