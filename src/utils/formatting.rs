use chrono::{DateTime, Local, Utc};
use console::style;
use tabled::{Table, Tabled, settings::{Style, Alignment}};

use crate::models::{CartState, CartSummary, Catalog, GiftBanner};

const PROGRESS_WIDTH: usize = 30;

#[derive(Tabled)]
struct ProductTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    pending: String,
}

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Total")]
    total: String,
}

pub fn format_money(symbol: &str, amount: u64) -> String {
    format!("{}{}", symbol, amount)
}

pub fn format_catalog_table(catalog: &Catalog, state: &CartState, symbol: &str) -> String {
    let rows: Vec<ProductTableRow> = catalog
        .products()
        .iter()
        .map(|product| ProductTableRow {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: format_money(symbol, product.price),
            pending: state.pending.get(product.id).to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

pub fn format_cart_table(catalog: &Catalog, state: &CartState, symbol: &str) -> String {
    if state.cart.is_empty() {
        return format!(
            "{}\n{}",
            style("Your cart is empty").bold(),
            style("Add some products to see them here!").dim()
        );
    }

    let rows: Vec<CartTableRow> = state
        .cart
        .lines()
        .iter()
        .map(|line| CartTableRow {
            id: line.id.to_string(),
            name: if catalog.is_gift(line.id) {
                format!("{} (free gift)", line.name)
            } else {
                line.name.clone()
            },
            quantity: line.quantity.to_string(),
            total: format!(
                "{} x {} = {}",
                line.quantity,
                format_money(symbol, line.unit_price),
                format_money(symbol, line.total())
            ),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

/// Plain-text bar, e.g. `[#########---------------------]  30%`
pub fn format_progress_bar(summary: &CartSummary) -> String {
    let filled = ((summary.progress * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        summary.progress_percent()
    )
}

pub fn format_progress_text(summary: &CartSummary, gift_name: &str, symbol: &str) -> String {
    if summary.amount_remaining > 0 {
        format!(
            "Add {} more to get a Free {}",
            format_money(symbol, summary.amount_remaining),
            gift_name
        )
    } else {
        format!("You've unlocked the free {}!", gift_name)
    }
}

pub fn format_gift_banner(banner: &GiftBanner, gift_name: &str) -> String {
    format!(
        "Congratulations! You've earned a free {}! ({})",
        gift_name,
        format_date(&banner.earned_at)
    )
}

/// Full cart panel: subtotal, banner, progress and lines
pub fn format_cart_summary(catalog: &Catalog, state: &CartState, symbol: &str) -> String {
    let summary = state.summary(catalog);
    let gift_name = &catalog.gift().name;
    let mut output = String::new();

    output.push_str(&format!(
        "{}: {}\n",
        style("Subtotal").bold(),
        style(format_money(symbol, summary.subtotal)).green()
    ));

    if let Some(banner) = &state.gift_banner {
        output.push_str(&format!("{}\n", style(format_gift_banner(banner, gift_name)).magenta().bold()));
    }

    let bar = format_progress_bar(&summary);
    let bar = if summary.gift_eligible {
        style(bar).green()
    } else {
        style(bar).yellow()
    };
    output.push_str(&format!("{}\n", bar));
    output.push_str(&format!("{}\n", style(format_progress_text(&summary, gift_name, symbol)).dim()));
    output.push_str(&format_cart_table(catalog, state, symbol));
    output.push('\n');

    output
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartAction, ProductId};

    fn summary_for(actions: &[CartAction]) -> CartSummary {
        let catalog = Catalog::standard();
        let state = actions.iter().fold(CartState::new(&catalog), |state, action| {
            state.reduce(action, &catalog).unwrap().state
        });
        state.summary(&catalog)
    }

    #[test]
    fn test_progress_text_remaining() {
        let summary = summary_for(&[
            CartAction::AddToCart { product_id: ProductId(2) },
            CartAction::AddToCart { product_id: ProductId(3) },
        ]);
        assert_eq!(
            format_progress_text(&summary, "Wireless Mouse", "₹"),
            "Add ₹600 more to get a Free Wireless Mouse"
        );
    }

    #[test]
    fn test_progress_text_unlocked() {
        let summary = summary_for(&[
            CartAction::SetPendingQuantity { product_id: ProductId(1), quantity: 2 },
            CartAction::AddToCart { product_id: ProductId(1) },
        ]);
        assert_eq!(
            format_progress_text(&summary, "Wireless Mouse", "$"),
            "You've unlocked the free Wireless Mouse!"
        );
    }

    #[test]
    fn test_progress_bar_bounds() {
        let empty = summary_for(&[]);
        assert_eq!(format_progress_bar(&empty), format!("[{}]   0%", "-".repeat(PROGRESS_WIDTH)));

        let full = summary_for(&[
            CartAction::SetPendingQuantity { product_id: ProductId(1), quantity: 4 },
            CartAction::AddToCart { product_id: ProductId(1) },
        ]);
        assert_eq!(format_progress_bar(&full), format!("[{}] 100%", "#".repeat(PROGRESS_WIDTH)));
    }

    #[test]
    fn test_empty_cart_placeholder() {
        let catalog = Catalog::standard();
        let state = CartState::new(&catalog);
        let rendered = console::strip_ansi_codes(&format_cart_table(&catalog, &state, "₹")).to_string();
        assert!(rendered.contains("Your cart is empty"));
        assert!(rendered.contains("Add some products to see them here!"));
    }

    #[test]
    fn test_cart_table_marks_gift() {
        let catalog = Catalog::standard();
        let state = [
            CartAction::SetPendingQuantity { product_id: ProductId(1), quantity: 2 },
            CartAction::AddToCart { product_id: ProductId(1) },
        ]
        .iter()
        .fold(CartState::new(&catalog), |state, action| {
            state.reduce(action, &catalog).unwrap().state
        });

        let rendered = format_cart_table(&catalog, &state, "₹");
        assert!(rendered.contains("Wireless Mouse (free gift)"));
        assert!(rendered.contains("2 x ₹500 = ₹1000"));
    }
}
