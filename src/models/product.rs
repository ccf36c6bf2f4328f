use serde::{Deserialize, Serialize};

/// Catalog identifier shared by products and the gift item
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        ProductId(id)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(ProductId)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in whole currency units
    pub price: u64,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, price: u64) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            price,
        }
    }

    pub fn line_total(&self, quantity: u32) -> u64 {
        self.price.saturating_mul(u64::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse() {
        assert_eq!(" 42 ".parse::<ProductId>().unwrap(), ProductId(42));
        assert!("abc".parse::<ProductId>().is_err());
        assert!("-1".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_line_total() {
        let laptop = Product::new(1, "Laptop", 500);
        assert_eq!(laptop.line_total(3), 1500);
        assert_eq!(laptop.line_total(0), 0);
    }
}
