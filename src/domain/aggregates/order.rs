//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::aggregates::cart::Cart;
use crate::domain::describe_validation;
use crate::domain::value_objects::{phone_digits, Money, PriceInput, MAX_AMOUNT};
use crate::error::OrderError;

pub const MIN_PHONE_DIGITS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "Pendente")]
    Pending,
    #[serde(alias = "Entregue")]
    Delivered,
    #[serde(alias = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "Pending", Self::Delivered => "Delivered", Self::Cancelled => "Cancelled" }
    }

    /// Delivered and cancelled orders get no further status actions in the back office.
    /// The store itself accepts any transition.
    pub fn is_terminal(&self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" | "Pendente" => Ok(Self::Pending),
            "Delivered" | "Entregue" => Ok(Self::Delivered),
            "Cancelled" | "Cancelado" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Pix,
    #[serde(alias = "Dinheiro")]
    Cash,
    #[serde(alias = "Cartão", alias = "Cartao")]
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pix => "Pix", Self::Cash => "Cash", Self::Card => "Card" }
    }

    /// Label shown to the customer and the shop.
    pub fn label(&self) -> &'static str {
        match self { Self::Pix => "Pix", Self::Cash => "Dinheiro", Self::Card => "Cartão" }
    }
}

/// Checkout form fields.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[validate(length(min = 3, message = "enter the full name"))]
    pub name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[serde(default)]
    pub document: Option<String>,
    #[validate(length(min = 5, message = "address too short, include street and number"))]
    pub address: String,
    pub payment_method: PaymentMethod,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone_digits(phone).len() >= MIN_PHONE_DIGITS { return Ok(()); }
    let mut err = ValidationError::new("phone");
    err.message = Some(format!("phone needs at least {MIN_PHONE_DIGITS} digits").into());
    Err(err)
}

impl CustomerInfo {
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            document: self.document.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            address: self.address.trim().to_string(),
            payment_method: self.payment_method,
        }
    }
}

/// One cart line as submitted by the client. Nothing here is trusted until validated.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub variant_id: Uuid,
    #[validate(length(min = 1, message = "product name is required"))]
    pub product_name: String,
    #[validate(length(min = 1, message = "variant name is required"))]
    pub variant_name: String,
    pub price: PriceInput,
    #[validate(range(min = 1, max = 100000, message = "quantity must be at least 1"))]
    pub quantity: u32,
}

/// A validated line. Names and price are the snapshot persisted on the order item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub variant_id: Uuid,
    pub product_name: String,
    pub variant_name: String,
    pub price: Money,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity) }
}

impl TryFrom<CartLine> for OrderLine {
    type Error = OrderError;
    fn try_from(line: CartLine) -> Result<Self, Self::Error> {
        line.validate().map_err(|e| OrderError::Validation(describe_validation(&e)))?;
        let price = line.price.to_money().map_err(|e| OrderError::Validation(format!("price: {e}")))?;
        Ok(Self {
            product_id: line.product_id,
            variant_id: line.variant_id,
            product_name: line.product_name.trim().to_string(),
            variant_name: line.variant_name.trim().to_string(),
            price,
            quantity: line.quantity,
        })
    }
}

/// Everything the store needs to persist one order. Only constructible through validation,
/// so the total is always the server-side sum of the lines.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    customer: CustomerInfo,
    lines: Vec<OrderLine>,
    total: Money,
}

impl OrderDraft {
    pub fn new(customer: CustomerInfo, lines: Vec<CartLine>) -> Result<Self, OrderError> {
        let customer = customer.trimmed();
        customer.validate().map_err(|e| OrderError::Validation(describe_validation(&e)))?;
        if lines.is_empty() { return Err(OrderError::Validation("cart is empty".into())); }
        let mut cart = Cart::new();
        for line in lines { cart.add_line(OrderLine::try_from(line)?); }
        let total = cart.subtotal();
        if total.amount() > MAX_AMOUNT {
            return Err(OrderError::Validation(format!("order total {} exceeds the maximum of {MAX_AMOUNT}", total.to_brl())));
        }
        Ok(Self { customer, lines: cart.into_lines(), total })
    }

    pub fn customer(&self) -> &CustomerInfo { &self.customer }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }

    /// Lines ordered by variant id. Concurrent orders that lock variant rows in this
    /// order cannot deadlock each other.
    pub fn lines_in_lock_order(&self) -> Vec<&OrderLine> {
        let mut lines: Vec<&OrderLine> = self.lines.iter().collect();
        lines.sort_by_key(|l| l.variant_id);
        lines
    }
    pub fn total(&self) -> Money { self.total }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_document: Option<String>,
    pub payment_method: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: i64,
    /// `None` once the variant was removed from the catalog; the snapshot fields remain.
    pub variant_id: Option<Uuid>,
    pub product_name: String,
    pub variant_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: i64,
    pub total: Money,
}
