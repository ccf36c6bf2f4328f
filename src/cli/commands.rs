use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Select};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    cli::args::*,
    models::{CartAction, CartLine, CartState, CartSummary, ProductId},
    services::{BatchReport, CartService, CartServiceError},
    utils::{
        formatting::{format_cart_summary, format_catalog_table, format_money},
        Config,
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static GIFT: Emoji<'_, '_> = Emoji("🎁 ", "");
static CART: Emoji<'_, '_> = Emoji("🛒 ", "");

#[derive(Serialize)]
struct CartReport<'a> {
    summary: CartSummary,
    lines: &'a [CartLine],
}

/// Read a JSON array of cart actions
pub fn load_actions(path: &Path) -> Result<Vec<CartAction>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read actions file {}", path.display()))?;
    let actions: Vec<CartAction> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid actions in {}", path.display()))?;
    Ok(actions)
}

pub struct CliApp {
    config: Config,
    cart_service: Arc<CartService>,
}

impl CliApp {
    pub fn new(config: Config) -> Result<Self> {
        let cart_service = Arc::new(
            CartService::from_config(&config).context("Failed to initialize cart")?,
        );

        Ok(Self {
            config,
            cart_service,
        })
    }

    pub fn cart_service(&self) -> &CartService {
        &self.cart_service
    }

    pub async fn run(&self, args: Args) -> Result<()> {
        match args.command {
            Commands::Catalog => self.handle_catalog(),
            Commands::Shop => self.handle_shop(),
            Commands::Replay { file, json } => self.handle_replay(&file, json),
            Commands::Run { actions, json } => {
                let actions = actions.into_iter().map(|a| a.0).collect();
                self.handle_actions(actions, json)
            }
        }
    }

    fn symbol(&self) -> &str {
        &self.config.currency_symbol
    }

    fn handle_catalog(&self) -> Result<()> {
        let catalog = self.cart_service.catalog();
        let state = self.cart_service.snapshot();

        println!("{} {}", CART, style("Products").bold().cyan());
        println!("{}", format_catalog_table(catalog, &state, self.symbol()));
        println!(
            "{} Spend {} to get a free {}",
            GIFT,
            style(format_money(self.symbol(), catalog.threshold())).yellow(),
            style(&catalog.gift().name).green()
        );
        Ok(())
    }

    fn handle_replay(&self, file: &Path, json: bool) -> Result<()> {
        let actions = load_actions(file)?;
        info!("Loaded {} actions from {}", actions.len(), file.display());
        self.handle_actions(actions, json)
    }

    fn handle_actions(&self, actions: Vec<CartAction>, json: bool) -> Result<()> {
        let report = match self.cart_service.dispatch_all(actions) {
            Ok(report) => report,
            Err(e @ CartServiceError::BatchFailed { .. }) => {
                println!("{} {}", CROSS, style(&e).red());
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        if json {
            self.print_json()
        } else {
            self.print_report(&report);
            self.print_cart();
            Ok(())
        }
    }

    fn print_report(&self, report: &BatchReport) {
        println!(
            "{} {} applied, {} unchanged",
            CHECKMARK,
            style(report.applied).green(),
            style(report.unchanged).dim()
        );
        for (index, action, err) in &report.failures {
            println!(
                "{} #{} {}: {}",
                WARNING,
                index + 1,
                style(action).yellow(),
                style(err).red()
            );
        }
    }

    fn print_cart(&self) {
        let state = self.cart_service.snapshot();
        println!("{} {}", CART, style("Cart Summary").bold().cyan());
        print!(
            "{}",
            format_cart_summary(self.cart_service.catalog(), &state, self.symbol())
        );
    }

    fn print_json(&self) -> Result<()> {
        let state = self.cart_service.snapshot();
        let report = CartReport {
            summary: state.summary(self.cart_service.catalog()),
            lines: state.cart.lines(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    // Interactive session
    fn handle_shop(&self) -> Result<()> {
        println!("{} {}", CART, style("Shopping Cart").bold().cyan());
        let theme = ColorfulTheme::default();
        let mut updates = self.cart_service.subscribe();

        loop {
            let state = updates.borrow_and_update().clone();
            self.render(&state);

            let choice = Select::with_theme(&theme)
                .with_prompt("What next?")
                .items(&[
                    "Change product quantity",
                    "Add product to cart",
                    "Change cart line quantity",
                    "Remove cart line",
                    "Refresh",
                    "Quit",
                ])
                .default(1)
                .interact()?;

            let outcome = match choice {
                0 => self.shop_pending_stepper(&theme, &state),
                1 => self.shop_add(&theme, &state),
                2 => self.shop_line_stepper(&theme, &state),
                3 => self.shop_remove(&theme, &state),
                4 => Ok(()),
                _ => break,
            };

            if let Err(e) = outcome {
                println!("{} {}", CROSS, style(&e).red());
                error!("Cart action failed: {}", e);
            }
        }

        info!("Shopping session ended");
        Ok(())
    }

    fn render(&self, state: &CartState) {
        let catalog = self.cart_service.catalog();
        println!();
        println!("{}", format_catalog_table(catalog, state, self.symbol()));
        print!("{}", format_cart_summary(catalog, state, self.symbol()));
    }

    fn pick_product(&self, theme: &ColorfulTheme, state: &CartState) -> Result<ProductId> {
        let products = self.cart_service.catalog().products();
        let labels: Vec<String> = products
            .iter()
            .map(|p| {
                format!(
                    "{} ({}) x{}",
                    p.name,
                    format_money(self.symbol(), p.price),
                    state.pending.get(p.id)
                )
            })
            .collect();

        let index = Select::with_theme(theme)
            .with_prompt("Product")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(products[index].id)
    }

    /// Editable lines only; the gift line is never offered
    fn pick_line(&self, theme: &ColorfulTheme, state: &CartState) -> Result<Option<ProductId>> {
        let catalog = self.cart_service.catalog();
        let lines: Vec<&CartLine> = state
            .cart
            .lines()
            .iter()
            .filter(|line| !catalog.is_gift(line.id))
            .collect();

        if lines.is_empty() {
            println!("{} Your cart is empty", WARNING);
            return Ok(None);
        }

        let labels: Vec<String> = lines
            .iter()
            .map(|line| format!("{} x{}", line.name, line.quantity))
            .collect();

        let index = Select::with_theme(theme)
            .with_prompt("Cart line")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(Some(lines[index].id))
    }

    fn shop_pending_stepper(&self, theme: &ColorfulTheme, state: &CartState) -> Result<()> {
        let product_id = self.pick_product(theme, state)?;
        let step = Select::with_theme(theme)
            .with_prompt("Quantity")
            .items(&["+", "-"])
            .default(0)
            .interact()?;

        if step == 1 && state.pending.get(product_id) <= 1 {
            println!("{} Quantity cannot go below 1", WARNING);
            return Ok(());
        }

        let result = if step == 0 {
            self.cart_service.increment_pending(product_id)
        } else {
            self.cart_service.decrement_pending(product_id)
        };
        result?;
        Ok(())
    }

    fn shop_add(&self, theme: &ColorfulTheme, state: &CartState) -> Result<()> {
        let product_id = self.pick_product(theme, state)?;
        let had_gift = state.summary(self.cart_service.catalog()).gift_present;
        let summary = self.cart_service.add_to_cart(product_id)?;

        println!("{} Added to cart", CHECKMARK);
        if summary.gift_present && !had_gift {
            println!(
                "{} {}",
                GIFT,
                style(format!(
                    "Congratulations! You've earned a free {}!",
                    self.cart_service.catalog().gift().name
                ))
                .magenta()
                .bold()
            );
        }
        Ok(())
    }

    fn shop_line_stepper(&self, theme: &ColorfulTheme, state: &CartState) -> Result<()> {
        let Some(product_id) = self.pick_line(theme, state)? else {
            return Ok(());
        };

        let step = Select::with_theme(theme)
            .with_prompt("Quantity")
            .items(&["+", "-"])
            .default(0)
            .interact()?;

        let summary = if step == 0 {
            self.cart_service.increment_line(product_id)?
        } else {
            self.cart_service.decrement_line(product_id)?
        };

        if !self.cart_service.snapshot().cart.contains(product_id) {
            println!("{} Line removed", CHECKMARK);
        }
        if !summary.gift_present && state.summary(self.cart_service.catalog()).gift_present {
            warn!("Free gift removed after quantity change");
            println!("{} The free gift was removed", WARNING);
        }
        Ok(())
    }

    fn shop_remove(&self, theme: &ColorfulTheme, state: &CartState) -> Result<()> {
        let Some(product_id) = self.pick_line(theme, state)? else {
            return Ok(());
        };
        self.cart_service.remove_from_cart(product_id)?;
        println!("{} Removed from cart", CHECKMARK);
        Ok(())
    }
}
