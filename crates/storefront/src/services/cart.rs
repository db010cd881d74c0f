//! Per-session shopping cart.
//!
//! A cart belongs to exactly one session and is never shared, so it needs no
//! synchronization and is never persisted. Lines hold the item snapshot taken
//! when the item was first added.

use rust_decimal::Decimal;

use agora_core::{ItemRef, ProductId};

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    item: ItemRef,
    quantity: u32,
}

impl CartLine {
    /// Item snapshot taken when the line was created.
    #[must_use]
    pub const fn item(&self) -> &ItemRef {
        &self.item
    }

    /// Quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.item.unit_price * Decimal::from(self.quantity)
    }
}

/// A session's shopping cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line for the item's ID, or appends a new line
    /// with quantity 1.
    pub fn add(&mut self, item: &ItemRef) {
        if let Some(line) = self.line_mut(item.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            });
        }
    }

    /// Remove one unit of `item`, dropping the line when it reaches zero.
    ///
    /// Removing an item that is not in the cart does nothing.
    pub fn remove(&mut self, item: &ItemRef) {
        let Some(line) = self.line_mut(item.id) else {
            return;
        };

        line.quantity -= 1;
        if line.quantity == 0 {
            self.lines.retain(|l| l.item.id != item.id);
        }
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order their items were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Quantity of the given product, or 0 if it is not in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.item.id == product_id)
            .map_or(0, |l| l.quantity)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.item.id == product_id)
    }
}
