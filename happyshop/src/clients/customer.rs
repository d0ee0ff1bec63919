//! The customer console: product search, trolley management, and checkout.
//!
//! Business-rule failures never abort the session: the message is shown, the trolley is adjusted where the rules say
//! so (clamped quantities, pruned shortages), and the customer carries on.

use std::sync::Arc;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use happyshop_engine::{
    checkout::{Receipt, SortKey, PRIME_DISCOUNT_PERCENT},
    order_types::{CustomerTier, PaymentMethod, Product},
    CheckoutOutcome,
    CheckoutPipeline,
    OrderHub,
    PaymentDecision,
    PaymentTerminal,
    StockDatabase,
    Trolley,
};
use hs_common::Money;
use log::*;

/// Prompts the user for a payment method and a confirm/cancel decision, mirroring the shop's payment dialog. Prime
/// customers see their discount before confirming.
pub struct ConsolePaymentTerminal {
    theme: ColorfulTheme,
}

impl ConsolePaymentTerminal {
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

impl PaymentTerminal for ConsolePaymentTerminal {
    async fn collect_payment(&self, total: Money, tier: CustomerTier) -> PaymentDecision {
        println!("💳 Payment required");
        if tier == CustomerTier::Prime {
            let discounted = total - total.percent_of(PRIME_DISCOUNT_PERCENT);
            println!("Original: {total}  |  Prime discount: -{PRIME_DISCOUNT_PERCENT}%");
            println!("Final amount: {discounted}");
        } else {
            println!("Total amount: {total}");
        }
        const METHODS: [(&str, PaymentMethod); 3] = [
            ("💳 Credit card", PaymentMethod::CreditCard),
            ("💳 Debit card", PaymentMethod::DebitCard),
            ("💵 Cash", PaymentMethod::Cash),
        ];
        let labels: Vec<&str> = METHODS.iter().map(|(label, _)| *label).collect();
        let choice = match Select::with_theme(&self.theme).with_prompt("Select payment method").items(&labels).default(0).interact() {
            Ok(i) => i,
            Err(e) => {
                warn!("💳️ Payment prompt aborted: {e}");
                return PaymentDecision::Cancelled;
            },
        };
        match Confirm::with_theme(&self.theme).with_prompt("Confirm payment?").interact() {
            Ok(true) => PaymentDecision::Confirmed(METHODS[choice].1),
            Ok(false) => PaymentDecision::Cancelled,
            Err(e) => {
                warn!("💳️ Payment prompt aborted: {e}");
                PaymentDecision::Cancelled
            },
        }
    }
}

pub struct CustomerConsole<B: StockDatabase> {
    stock: B,
    pipeline: CheckoutPipeline<B, ConsolePaymentTerminal>,
    trolley: Trolley,
    tier: CustomerTier,
    search_results: Vec<Product>,
}

impl<B: StockDatabase> CustomerConsole<B> {
    pub fn new(stock: B, hub: Arc<OrderHub>) -> Self {
        let pipeline = CheckoutPipeline::new(stock.clone(), hub, ConsolePaymentTerminal::new());
        Self { stock, pipeline, trolley: Trolley::new(), tier: CustomerTier::Standard, search_results: Vec::new() }
    }

    pub async fn run(&mut self, theme: &ColorfulTheme) -> Result<()> {
        const COMMANDS: [&str; 9] = [
            "Search products",
            "Add to trolley",
            "Show trolley",
            "Edit a line",
            "Sort trolley",
            "Set customer tier",
            "Check out",
            "Cancel trolley",
            "Back",
        ];
        loop {
            let prompt = format!("Customer ({}) | trolley total {}", self.tier, self.trolley.total());
            let i = Select::with_theme(theme).with_prompt(prompt).items(&COMMANDS).default(0).interact()?;
            match COMMANDS[i] {
                "Search products" => self.search(theme).await?,
                "Add to trolley" => self.add_to_trolley(theme)?,
                "Show trolley" => println!("{}", self.trolley.display()),
                "Edit a line" => self.edit_line(theme)?,
                "Sort trolley" => self.sort(theme)?,
                "Set customer tier" => self.set_tier(theme)?,
                "Check out" => self.check_out().await?,
                "Cancel trolley" => {
                    self.trolley.clear();
                    self.search_results.clear();
                    println!("Trolley cancelled.");
                },
                _ => return Ok(()),
            }
        }
    }

    async fn search(&mut self, theme: &ColorfulTheme) -> Result<()> {
        let keyword: String = Input::with_theme(theme).with_prompt("Product id or description").interact_text()?;
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            println!("Please type a product id or part of a description.");
            return Ok(());
        }
        self.search_results = self.stock.search_products(&keyword).await?;
        if self.search_results.is_empty() {
            println!("No product was found for '{keyword}'.");
            return Ok(());
        }
        for p in &self.search_results {
            let stock_note = if p.stock_quantity < 100 { format!(" ({} units left)", p.stock_quantity) } else { String::new() };
            println!("  {}  {}  {}/unit{stock_note}", p.id, p.description, p.unit_price);
        }
        Ok(())
    }

    fn add_to_trolley(&mut self, theme: &ColorfulTheme) -> Result<()> {
        let available: Vec<&Product> = self.search_results.iter().filter(|p| p.stock_quantity > 0).collect();
        if available.is_empty() {
            println!("Search for an available product before adding it to the trolley.");
            return Ok(());
        }
        let labels: Vec<String> = available.iter().map(|p| format!("{}  {}  {}", p.id, p.description, p.unit_price)).collect();
        let choice = Select::with_theme(theme).with_prompt("Add which product?").items(&labels).default(0).interact()?;
        self.trolley.add_product(available[choice]);
        println!("{}", self.trolley.display());
        Ok(())
    }

    fn edit_line(&mut self, theme: &ColorfulTheme) -> Result<()> {
        if self.trolley.is_empty() {
            println!("Your trolley is empty.");
            return Ok(());
        }
        let labels: Vec<String> =
            self.trolley.items().iter().map(|p| format!("{}  {}  x{}", p.id, p.description, p.ordered_quantity)).collect();
        let line = Select::with_theme(theme).with_prompt("Which line?").items(&labels).default(0).interact()?;
        let id = self.trolley.items()[line].id.clone();
        const EDITS: [&str; 4] = ["Set quantity", "Add one", "Remove one", "Remove line"];
        let action = Select::with_theme(theme).with_prompt("Edit").items(&EDITS).default(0).interact()?;
        match EDITS[action] {
            "Set quantity" => {
                let quantity: u32 = Input::with_theme(theme).with_prompt("New quantity").interact_text()?;
                if quantity == 0 {
                    println!("Quantity must be at least 1; use 'Remove line' to drop it.");
                } else {
                    self.trolley.set_quantity(&id, quantity);
                }
            },
            "Add one" => self.trolley.change_quantity(&id, 1),
            "Remove one" => self.trolley.change_quantity(&id, -1),
            _ => self.trolley.remove_item(&id),
        }
        println!("{}", self.trolley.display());
        Ok(())
    }

    fn sort(&mut self, theme: &ColorfulTheme) -> Result<()> {
        const SORTS: [(&str, SortKey); 5] = [
            ("By id", SortKey::IdAsc),
            ("By price (low to high)", SortKey::PriceAsc),
            ("By price (high to low)", SortKey::PriceDesc),
            ("By description", SortKey::DescriptionAsc),
            ("By line total (high to low)", SortKey::TotalDesc),
        ];
        let labels: Vec<&str> = SORTS.iter().map(|(label, _)| *label).collect();
        let choice = Select::with_theme(theme).with_prompt("Sort trolley").items(&labels).default(0).interact()?;
        self.trolley.sort_by(SORTS[choice].1);
        println!("{}", self.trolley.display());
        Ok(())
    }

    fn set_tier(&mut self, theme: &ColorfulTheme) -> Result<()> {
        const TIERS: [CustomerTier; 3] = [CustomerTier::Standard, CustomerTier::Vip, CustomerTier::Prime];
        let labels: Vec<String> = TIERS.iter().map(|t| t.to_string()).collect();
        let choice = Select::with_theme(theme).with_prompt("Customer tier").items(&labels).default(0).interact()?;
        self.tier = TIERS[choice];
        Ok(())
    }

    async fn check_out(&mut self) -> Result<()> {
        let outcome = self.pipeline.checkout(&mut self.trolley, self.tier).await?;
        match outcome {
            CheckoutOutcome::Completed(receipt) => {
                println!("✓ Thank you for your order!\n");
                println!("{receipt}");
                self.search_results.clear();
                self.offer_receipt_file(&receipt).await;
            },
            CheckoutOutcome::MinimumSpend { actual, required } => {
                println!("⚠️ Minimum payment is {required}");
                println!("Current total: {actual}");
                println!("Please add {} more to proceed.", required - actual);
            },
            CheckoutOutcome::ExcessiveQuantity { offending, cap } => {
                println!("⚠️ The following items exceed the maximum quantity limit:");
                for line in &offending {
                    println!("• {} - {}", line.id, line.description);
                    println!("  Requested: {} (Max allowed: {cap})", line.ordered_quantity);
                    println!("  Reduced to maximum: {cap}");
                }
                println!("✓ Quantities have been adjusted in your trolley.");
                println!("💡 Please check out again to proceed with your order.");
            },
            CheckoutOutcome::Shortage(shortages) => {
                println!("⚠️ Some items were removed from your trolley for lack of stock:");
                for line in &shortages {
                    println!("• {}, {} (Only {} available, {} requested)", line.id, line.description, line.stock_quantity, line.ordered_quantity);
                }
                println!("You can search for alternatives and add them to your trolley.");
            },
            CheckoutOutcome::PaymentCancelled => {
                println!("Payment cancelled. Your trolley is unchanged.");
            },
            CheckoutOutcome::EmptyTrolley => {
                println!("Your trolley is empty.");
            },
        }
        debug!("🧾️ Checkout attempt finished; trolley total is now {}", self.trolley.total());
        Ok(())
    }

    async fn offer_receipt_file(&self, receipt: &Receipt) {
        let wants_copy = Confirm::new().with_prompt("Save a copy of the receipt?").default(false).interact().unwrap_or(false);
        if !wants_copy {
            return;
        }
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("receipt_{}_{timestamp}.txt", receipt.order_id.value());
        let banner = "=".repeat(50);
        let body = format!("{banner}\nHAPPYSHOP RECEIPT\n{banner}\n{receipt}{banner}\n");
        match tokio::fs::write(&filename, body).await {
            Ok(()) => println!("Receipt saved to {filename}"),
            Err(e) => {
                warn!("🧾️ Could not save the receipt: {e}");
                println!("Could not save the receipt: {e}");
            },
        }
    }
}
