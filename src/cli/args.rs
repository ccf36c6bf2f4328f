use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::models::{CartAction, ProductId};

#[derive(Parser)]
#[command(name = "gift-cart")]
#[command(about = "A shopping cart that unlocks a free gift above a spending threshold")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the products, the free gift and its threshold
    Catalog,
    /// Start an interactive shopping session
    Shop,
    /// Apply a JSON array of cart actions from a file
    Replay {
        /// Path to the actions file
        file: PathBuf,
        /// Print the final cart as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply inline actions, e.g. `pending:1=2 add:1 dec:1`
    Run {
        /// Actions: add:<id>, pending:<id>=<n>, set:<id>=<n>, inc:<id>, dec:<id>, remove:<id>
        #[arg(required = true)]
        actions: Vec<InlineAction>,
        /// Print the final cart as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Inline action token accepted by `gift-cart run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction(pub CartAction);

impl FromStr for InlineAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <verb>:<id>, got '{}'", s))?;

        let parse_id = |raw: &str| -> Result<ProductId, String> {
            raw.parse::<ProductId>()
                .map_err(|e| format!("invalid product id '{}': {}", raw, e))
        };

        let parse_assignment = |raw: &str| -> Result<(ProductId, i64), String> {
            let (id, quantity) = raw
                .split_once('=')
                .ok_or_else(|| format!("expected <id>=<quantity>, got '{}'", raw))?;
            let quantity = quantity
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
            Ok((parse_id(id)?, quantity))
        };

        let action = match verb.trim() {
            "add" => CartAction::AddToCart { product_id: parse_id(rest)? },
            "pending" => {
                let (product_id, quantity) = parse_assignment(rest)?;
                CartAction::SetPendingQuantity { product_id, quantity }
            }
            "set" => {
                let (product_id, quantity) = parse_assignment(rest)?;
                CartAction::UpdateCartLine { product_id, quantity }
            }
            "inc" => CartAction::IncrementLine { product_id: parse_id(rest)? },
            "dec" => CartAction::DecrementLine { product_id: parse_id(rest)? },
            "remove" => CartAction::RemoveFromCart { product_id: parse_id(rest)? },
            other => return Err(format!("unknown action '{}'", other)),
        };

        Ok(InlineAction(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_actions() {
        assert_eq!(
            "add:1".parse::<InlineAction>().unwrap().0,
            CartAction::AddToCart { product_id: ProductId(1) }
        );
        assert_eq!(
            "pending:2=3".parse::<InlineAction>().unwrap().0,
            CartAction::SetPendingQuantity { product_id: ProductId(2), quantity: 3 }
        );
        assert_eq!(
            "set:4=-1".parse::<InlineAction>().unwrap().0,
            CartAction::UpdateCartLine { product_id: ProductId(4), quantity: -1 }
        );
        assert_eq!(
            "dec:3".parse::<InlineAction>().unwrap().0,
            CartAction::DecrementLine { product_id: ProductId(3) }
        );
    }

    #[test]
    fn test_parse_inline_errors() {
        assert!("add".parse::<InlineAction>().is_err());
        assert!("add:x".parse::<InlineAction>().is_err());
        assert!("pending:1".parse::<InlineAction>().is_err());
        assert!("buy:1".parse::<InlineAction>().is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let args = Args::try_parse_from(["gift-cart", "-v", "run", "pending:1=2", "add:1", "--json"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Run { actions, json } => {
                assert_eq!(actions.len(), 2);
                assert!(json);
            }
            _ => panic!("expected run command"),
        }
    }
}
