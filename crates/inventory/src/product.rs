use chrono::{DateTime, Utc};
use serde::Deserialize;

use inventorix_core::validate::{required, text};
use inventorix_core::{
    CategoryId, DomainError, DomainResult, Entity, Owned, ProductId, UserId, WarehouseId,
};

const NAME_MAX: usize = 200;

/// A stocked product. References one category and one warehouse, both owned
/// by the same user as the product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub category_id: CategoryId,
    pub warehouse_id: WarehouseId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub warehouse_id: Option<WarehouseId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub category_id: CategoryId,
    pub warehouse_id: WarehouseId,
}

/// Patchable fields of a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub warehouse_id: Option<WarehouseId>,
}

impl ProductDraft {
    /// Field checks only; reference ownership needs the store and is checked there.
    pub fn validate(self) -> DomainResult<NewProduct> {
        Ok(NewProduct {
            name: validate_name(required("name", self.name)?)?,
            price: validate_price(required("price", self.price)?)?,
            quantity: validate_quantity(self.quantity.unwrap_or(0))?,
            category_id: required("category_id", self.category_id)?,
            warehouse_id: required("warehouse_id", self.warehouse_id)?,
        })
    }
}

impl ProductPatch {
    /// References this patch would move the product to, if any.
    pub fn references(&self) -> (Option<CategoryId>, Option<WarehouseId>) {
        (self.category_id, self.warehouse_id)
    }
}

impl Product {
    pub fn apply(&self, patch: ProductPatch) -> DomainResult<Product> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = validate_name(name)?;
        }
        if let Some(price) = patch.price {
            next.price = validate_price(price)?;
        }
        if let Some(quantity) = patch.quantity {
            next.quantity = validate_quantity(quantity)?;
        }
        if let Some(category_id) = patch.category_id {
            next.category_id = category_id;
        }
        if let Some(warehouse_id) = patch.warehouse_id {
            next.warehouse_id = warehouse_id;
        }
        Ok(next)
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Product name cannot be empty"));
    }
    text("name", name, NAME_MAX)
}

fn validate_price(price: f64) -> DomainResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::validation("Price must be positive"));
    }
    Ok(price)
}

fn validate_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity < 0 {
        return Err(DomainError::validation("Quantity cannot be negative"));
    }
    Ok(quantity)
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Owned for Product {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: Some("Hammer".into()),
            price: Some(9.5),
            quantity: None,
            category_id: Some(CategoryId::new(1)),
            warehouse_id: Some(WarehouseId::new(1)),
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Hammer".into(),
            price: 9.5,
            quantity: 4,
            created_at: Utc::now(),
            category_id: CategoryId::new(1),
            warehouse_id: WarehouseId::new(1),
            user_id: UserId::new(1),
        }
    }

    #[test]
    fn quantity_defaults_to_zero() {
        assert_eq!(draft().validate().unwrap().quantity, 0);
    }

    #[test]
    fn references_are_required() {
        let err = ProductDraft {
            category_id: None,
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, DomainError::validation("category_id is required"));

        let err = ProductDraft {
            warehouse_id: None,
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, DomainError::validation("warehouse_id is required"));
    }

    #[test]
    fn empty_name_is_rejected_before_price() {
        let err = ProductDraft {
            name: Some("".into()),
            price: Some(-1.0),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, DomainError::validation("Product name cannot be empty"));
    }

    #[test]
    fn non_finite_price_is_rejected() {
        for price in [f64::NAN, f64::INFINITY] {
            assert!(
                ProductDraft {
                    price: Some(price),
                    ..draft()
                }
                .validate()
                .is_err()
            );
        }
    }

    #[test]
    fn patch_with_one_invalid_field_changes_nothing() {
        let original = product();
        let err = original
            .apply(ProductPatch {
                name: Some("Mallet".into()),
                quantity: Some(-1),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, DomainError::validation("Quantity cannot be negative"));
        assert_eq!(original.name, "Hammer");
        assert_eq!(original.quantity, 4);
    }

    #[test]
    fn patch_moves_references() {
        let updated = product()
            .apply(ProductPatch {
                warehouse_id: Some(WarehouseId::new(7)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.warehouse_id, WarehouseId::new(7));
        assert_eq!(updated.category_id, CategoryId::new(1));
    }

    proptest! {
        #[test]
        fn non_positive_price_always_fails(price in -1.0e9f64..=0.0) {
            let res = ProductDraft { price: Some(price), ..draft() }.validate();
            prop_assert_eq!(res.unwrap_err(), DomainError::validation("Price must be positive"));
        }

        #[test]
        fn positive_price_and_quantity_always_pass(price in 0.01f64..1.0e9, quantity in 0i64..1_000_000) {
            let new = ProductDraft { price: Some(price), quantity: Some(quantity), ..draft() }
                .validate()
                .unwrap();
            prop_assert_eq!(new.quantity, quantity);
        }

        #[test]
        fn negative_quantity_patch_always_fails(quantity in i64::MIN..0) {
            let res = product().apply(ProductPatch { quantity: Some(quantity), ..Default::default() });
            prop_assert!(res.is_err());
        }
    }
}
