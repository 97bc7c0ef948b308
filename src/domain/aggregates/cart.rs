//! Cart Aggregate
//!
//! Request-scoped: built from the submitted lines, consumed by the order draft.
//! Nothing about a cart outlives the request that carried it.

use crate::domain::aggregates::order::OrderLine;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<OrderLine>,
    subtotal: Money,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[OrderLine] { &self.lines }
    pub fn subtotal(&self) -> Money { self.subtotal }
    pub fn item_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Same variant at the same price collapses into one line.
    pub fn add_line(&mut self, line: OrderLine) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.variant_id == line.variant_id && l.price == line.price) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
        self.recalculate();
    }

    pub fn into_lines(self) -> Vec<OrderLine> { self.lines }

    fn recalculate(&mut self) {
        self.subtotal = self.lines.iter().fold(Money::ZERO, |acc, l| acc.add(l.line_total()));
    }
}
