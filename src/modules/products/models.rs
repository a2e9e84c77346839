use serde::{Deserialize, Serialize};
use shopfront_db::{Document, ObjectId};
use time::OffsetDateTime;

/// Product fields supplied by clients and stored as the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Image URL
    pub image: String,
    /// Free-text label
    pub category: String,
    pub stock: i64,
}

impl NewProduct {
    /// Field constraints enforced before anything reaches the store.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("image", &self.image),
            ("category", &self.category),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        if self.stock < 0 {
            return Err("stock must be a non-negative integer".to_string());
        }
        Ok(())
    }
}

/// A stored product as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: NewProduct,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Document<NewProduct>> for Product {
    fn from(document: Document<NewProduct>) -> Self {
        Self {
            id: document.id,
            fields: document.body,
            created_at: document.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewProduct {
        NewProduct {
            name: "Desk Lamp".to_string(),
            description: "Warm light".to_string(),
            price: 19.5,
            image: "https://example.com/lamp.jpg".to_string(),
            category: "Home".to_string(),
            stock: 3,
        }
    }

    #[test]
    fn accepts_valid_product() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn rejects_blank_required_field() {
        let product = NewProduct {
            description: "   ".to_string(),
            ..valid()
        };
        assert_eq!(product.validate(), Err("description is required".to_string()));
    }

    #[test]
    fn rejects_negative_or_non_finite_price() {
        for price in [-0.01, f64::NAN, f64::INFINITY] {
            let product = NewProduct { price, ..valid() };
            assert!(product.validate().is_err(), "price {price} accepted");
        }
    }

    #[test]
    fn rejects_negative_stock() {
        let product = NewProduct {
            stock: -1,
            ..valid()
        };
        assert!(product.validate().is_err());
    }

    #[test]
    fn product_serializes_with_document_field_names() {
        let product = Product {
            id: ObjectId::from_bytes([1; 12]),
            fields: valid(),
            created_at: time::macros::datetime!(2024-05-01 12:00 UTC),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["_id"], "010101010101010101010101");
        assert_eq!(json["name"], "Desk Lamp");
        assert_eq!(json["stock"], 3);
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
        assert!(json.get("fields").is_none());
    }
}
