//! Order message for the fulfillment channel.
//!
//! The shop receives orders on WhatsApp: the customer is handed a `wa.me` link with the
//! order text prefilled. Nothing is sent from here and delivery is not tracked.

use std::fmt::Write;

use crate::domain::aggregates::{OrderDraft, PlacedOrder};
use crate::domain::value_objects::phone_digits;

const COUNTRY_CODE: &str = "55";
/// Longest Brazilian number without country code: two-digit area code plus nine digits.
const NATIONAL_NUMBER_MAX_LEN: usize = 11;

pub fn order_message(placed: &PlacedOrder, draft: &OrderDraft) -> String {
    let customer = draft.customer();
    let mut text = String::new();
    let _ = writeln!(text, "*Pedido #{}*", placed.order_id);
    let _ = writeln!(text);
    let _ = writeln!(text, "*Cliente:* {}", customer.name);
    let _ = writeln!(text, "*Telefone:* {}", customer.phone);
    if let Some(document) = &customer.document {
        let _ = writeln!(text, "*Documento:* {document}");
    }
    let _ = writeln!(text, "*Endereço:* {}", customer.address);
    let _ = writeln!(text, "*Pagamento:* {}", customer.payment_method.label());
    let _ = writeln!(text);
    let _ = writeln!(text, "*Itens:*");
    for line in draft.lines() {
        let _ = writeln!(text, "{}x {} ({}) - {}", line.quantity, line.product_name, line.variant_name, line.line_total().to_brl());
    }
    let _ = writeln!(text);
    let _ = write!(text, "*Total: {}*", placed.total.to_brl());
    text
}

/// `https://wa.me/<number>?text=<message>`, adding the country code to national numbers.
pub fn whatsapp_link(number: &str, text: &str) -> String {
    let digits = phone_digits(number);
    let full = if digits.len() <= NATIONAL_NUMBER_MAX_LEN { format!("{COUNTRY_CODE}{digits}") } else { digits };
    format!("https://wa.me/{full}?text={}", urlencoding::encode(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{CartLine, CustomerInfo, PaymentMethod};
    use crate::domain::value_objects::Money;
    use uuid::Uuid;

    fn draft() -> OrderDraft {
        let customer = CustomerInfo {
            name: "João Souza".into(), phone: "83 99999-0000".into(), document: Some("123.456.789-00".into()),
            address: "Av. Epitácio Pessoa, 1000".into(), payment_method: PaymentMethod::Cash,
        };
        let line = CartLine {
            product_id: Uuid::new_v4(), variant_id: Uuid::new_v4(), product_name: "Picanha Fatiada".into(),
            variant_name: "Bandeja 500g".into(), price: "45,90".into(), quantity: 2,
        };
        OrderDraft::new(customer, vec![line]).unwrap()
    }

    #[test]
    fn test_message_lists_order_details() {
        let d = draft();
        let text = order_message(&PlacedOrder { order_id: 42, total: d.total() }, &d);
        assert!(text.starts_with("*Pedido #42*"));
        assert!(text.contains("*Cliente:* João Souza"));
        assert!(text.contains("*Documento:* 123.456.789-00"));
        assert!(text.contains("*Pagamento:* Dinheiro"));
        assert!(text.contains("2x Picanha Fatiada (Bandeja 500g) - R$ 91,80"));
        assert!(text.ends_with("*Total: R$ 91,80*"));
    }

    #[test]
    fn test_link_encodes_text_and_country_code() {
        assert_eq!(whatsapp_link("(83) 99418-9808", "Olá mundo"), "https://wa.me/5583994189808?text=Ol%C3%A1%20mundo");
        assert_eq!(whatsapp_link("5583994189808", "x"), "https://wa.me/5583994189808?text=x");
    }

    #[test]
    fn test_total_matches_lines() {
        let d = draft();
        assert_eq!(d.total(), Money::parse("91.80").unwrap());
    }
}
