//! Catalog and stock records as reported by the inventory API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// Catalog attributes for a product.
///
/// Everything except `id` is opaque to the cart: it is copied from the
/// catalog when the product is first added and carried along unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price in the store currency, encoded as a JSON number with
    /// every digit kept.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub image: String,
}

impl Product {
    /// Unit price tagged with the given currency.
    #[must_use]
    pub const fn price_in(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }
}

/// A live stock reading for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Units currently available.
    pub amount: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_decodes_numeric_price() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://example.com/shoe-1.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(1799, 1));
    }

    #[test]
    fn test_product_decodes_integer_price() {
        let json = r#"{"id": 2, "title": "Tênis", "price": 139, "image": ""}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(139, 0));
    }

    #[test]
    fn test_product_price_keeps_trailing_digits() {
        let json = r#"{"id": 7, "title": "Tênis", "price": 1234567890123456.78, "image": ""}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(123_456_789_012_345_678, 2));
        assert_eq!(
            serde_json::to_string(&product).unwrap(),
            r#"{"id":7,"title":"Tênis","price":1234567890123456.78,"image":""}"#
        );
    }

    #[test]
    fn test_stock_decodes() {
        let stock: Stock = serde_json::from_str(r#"{"id": 3, "amount": 0}"#).unwrap();
        assert_eq!(stock.id, ProductId::new(3));
        assert_eq!(stock.amount, 0);
    }

    #[test]
    fn test_stock_rejects_negative_amount() {
        assert!(serde_json::from_str::<Stock>(r#"{"id": 3, "amount": -1}"#).is_err());
    }
}
