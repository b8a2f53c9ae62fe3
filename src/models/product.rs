use serde::{Deserialize, Serialize};

use super::de;

const MAX_NAME_LEN: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    pub low_stock: bool,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        let low_stock = product.is_low_stock();
        Self { product, low_stock }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    #[serde(default)]
    pub min_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl ProductDraft {
    /// Checks required fields before the draft is sent to the backend.
    /// Returns every problem at once so the form can mark all fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = vec![];

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "name is required"));
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new("name", "name must be at most 120 characters"));
        }

        match self.price {
            None => errors.push(FieldError::new("price", "price is required")),
            Some(p) if !p.is_finite() || p < 0.0 => {
                errors.push(FieldError::new("price", "price must be a non-negative number"))
            }
            Some(_) => {}
        }

        match self.stock {
            None => errors.push(FieldError::new("stock", "stock is required")),
            Some(s) if s < 0 => errors.push(FieldError::new("stock", "stock cannot be negative")),
            Some(_) => {}
        }

        if self.min_stock < 0 {
            errors.push(FieldError::new("minStock", "minimum stock cannot be negative"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
