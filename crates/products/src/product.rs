//! Product entity and its mutation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkeep_core::{DomainError, DomainResult, Price, ProductId, UserId};

/// The sole persistent entity: a product record owned by its creator.
///
/// `owner_id` is set at creation and immutable thereafter — no mutation
/// payload can carry it, so the invariant holds at the type level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity: u32,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Apply a partial update. Fields absent from the patch are untouched.
    ///
    /// Timestamp maintenance is the store's job (mirroring an
    /// on-update-refresh column), so this only mutates domain fields.
    pub fn apply_patch(&mut self, patch: &ProductPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            self.name = validated_text("name", name)?;
        }
        if let Some(description) = &patch.description {
            self.description = validated_text("description", description)?;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }
}

/// Payload for creating a product. Validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity: u32,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
        quantity: u32,
    ) -> DomainResult<Self> {
        Ok(Self {
            name: validated_text("name", &name.into())?,
            description: validated_text("description", &description.into())?,
            price,
            quantity,
        })
    }
}

/// Partial-update payload. `None` means "leave the field alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub quantity: Option<u32>,
}

impl ProductPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

fn validated_text(field: &str, value: &str) -> DomainResult<String> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: price("19.99"),
            quantity: 100,
            owner_id: UserId::new(7),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn new_product_rejects_blank_name() {
        let err = NewProduct::new("   ", "desc", price("1.00"), 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_product_rejects_blank_description() {
        let err = NewProduct::new("Widget", "", price("1.00"), 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut product = sample_product();
        let patch = ProductPatch::default().with_quantity(42);

        product.apply_patch(&patch).unwrap();

        assert_eq!(product.quantity, 42);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, price("19.99"));
    }

    #[test]
    fn patch_rejects_blank_name() {
        let mut product = sample_product();
        let patch = ProductPatch::default().with_name("  ");

        let err = product.apply_patch(&patch).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
