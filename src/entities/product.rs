// 🦐 Product Entity - raw-material size range with stable identity
//
// "Product name is a VALUE (can change), Product UUID is IDENTITY (never changes)"
//
// Problem solved:
// - Renaming or resizing a product never shifts which row an edit applies to
// - Deleting a row doesn't make the next edit land on a neighbour

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const CONTEXT: &str = "ProductCatalog";

// ============================================================================
// PRODUCT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    /// Display name, unique within the catalog
    pub name: String,

    /// Smallest raw-material size (inclusive)
    pub smallest_size: u32,

    /// Largest raw-material size (inclusive)
    pub largest_size: u32,
}

impl Product {
    /// Create a validated product with a fresh UUID.
    pub fn new(name: &str, smallest_size: u32, largest_size: u32) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        validate_range(smallest_size, largest_size)?;

        Ok(Product {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            smallest_size,
            largest_size,
        })
    }

    pub fn sizes(&self) -> RangeInclusive<u32> {
        self.smallest_size..=self.largest_size
    }

    /// Number of integer sizes the range spans (always >= 1 for a valid product)
    pub fn size_count(&self) -> usize {
        (self.largest_size.saturating_sub(self.smallest_size) as usize) + 1
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(CONTEXT, "name", "Product name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_range(smallest: u32, largest: u32) -> Result<(), ValidationError> {
    if smallest == 0 {
        return Err(ValidationError::new(
            CONTEXT,
            "smallest_size",
            "Sizes must be positive integers",
        ));
    }
    if smallest > largest {
        return Err(ValidationError::new(
            CONTEXT,
            "largest_size",
            format!("Smallest size {} is greater than largest size {}", smallest, largest),
        ));
    }
    Ok(())
}

// ============================================================================
// PRODUCT CATALOG
// ============================================================================

/// Ordered list of products, in the order the operator added them.
///
/// Adding and editing through the catalog keeps names unique. A catalog
/// deserialized from JSON is taken as-is, so it may carry duplicates; lookups
/// then return the first match in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the five sample products
    pub fn with_defaults() -> Self {
        let mut catalog = ProductCatalog::new();
        let defaults = [
            ("Product 1", 13, 17),
            ("Product 2", 20, 24),
            ("Product 3", 18, 23),
            ("Product 4", 5, 10),
            ("Product 5", 9, 16),
        ];

        for (name, smallest, largest) in defaults {
            if let Ok(product) = Product::new(name, smallest, largest) {
                catalog.products.push(product);
            }
        }

        catalog
    }

    /// Add a product; rejects empty/duplicate names and invalid ranges.
    pub fn add(&mut self, name: &str, smallest_size: u32, largest_size: u32) -> Result<&Product, ValidationError> {
        let product = Product::new(name, smallest_size, largest_size)?;
        if self.find(&product.name).is_some() {
            return Err(ValidationError::duplicate(
                CONTEXT,
                "name",
                format!("Product '{}' already exists", product.name),
            ));
        }

        self.products.push(product);
        let idx = self.products.len() - 1;
        Ok(&self.products[idx])
    }

    /// Rename/resize a product in place, addressed by its id.
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        smallest_size: u32,
        largest_size: u32,
    ) -> Result<(), ValidationError> {
        let name = validate_name(name)?;
        validate_range(smallest_size, largest_size)?;

        if self.products.iter().any(|p| p.id != id && p.name == name) {
            return Err(ValidationError::duplicate(
                CONTEXT,
                "name",
                format!("Product '{}' already exists", name),
            ));
        }

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ValidationError::missing(CONTEXT, "id", format!("Unknown product id: {}", id)))?;

        product.name = name;
        product.smallest_size = smallest_size;
        product.largest_size = largest_size;
        Ok(())
    }

    /// Remove a product by id
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let idx = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(idx))
    }

    /// First product with this name, in catalog order.
    pub fn find(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.products.iter().map(|p| p.name.clone()).collect()
    }

    /// Names that appear more than once (each reported once)
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut dups: Vec<String> = Vec::new();
        for (i, product) in self.products.iter().enumerate() {
            let seen_before = self.products[..i].iter().any(|p| p.name == product.name);
            if seen_before && !dups.contains(&product.name) {
                dups.push(product.name.clone());
            }
        }
        dups
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_creation() {
        let product = Product::new("  Black Tiger  ", 13, 17).unwrap();

        assert!(!product.id.is_empty());
        assert_eq!(product.name, "Black Tiger");
        assert_eq!(product.sizes(), 13..=17);
        assert_eq!(product.size_count(), 5);
    }

    #[test]
    fn test_product_rejects_invalid_input() {
        assert_eq!(Product::new("", 5, 10).unwrap_err().field, "name");
        assert_eq!(Product::new("   ", 5, 10).unwrap_err().field, "name");
        assert_eq!(Product::new("P", 0, 10).unwrap_err().field, "smallest_size");
        assert_eq!(Product::new("P", 11, 10).unwrap_err().field, "largest_size");

        // Single-size range is valid
        assert_eq!(Product::new("P", 7, 7).unwrap().size_count(), 1);
    }

    #[test]
    fn test_catalog_defaults() {
        let catalog = ProductCatalog::with_defaults();

        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.names(),
            vec!["Product 1", "Product 2", "Product 3", "Product 4", "Product 5"]
        );

        let p4 = catalog.find("Product 4").unwrap();
        assert_eq!((p4.smallest_size, p4.largest_size), (5, 10));
    }

    #[test]
    fn test_catalog_rejects_duplicate_name() {
        let mut catalog = ProductCatalog::with_defaults();

        let err = catalog.add("Product 1", 1, 2).unwrap_err();
        assert!(err.message.contains("already exists"));
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_catalog_update_by_id() {
        let mut catalog = ProductCatalog::with_defaults();
        let id = catalog.find("Product 2").unwrap().id.clone();

        catalog.update(&id, "Vannamei", 21, 25).unwrap();

        let updated = catalog.find_by_id(&id).unwrap();
        assert_eq!(updated.name, "Vannamei");
        assert_eq!(updated.sizes(), 21..=25);
        assert!(catalog.find("Product 2").is_none());

        // Keeping its own name is not a duplicate
        catalog.update(&id, "Vannamei", 20, 24).unwrap();

        // Taking another product's name is
        assert!(catalog.update(&id, "Product 3", 20, 24).is_err());
        assert!(catalog.update("no-such-id", "X", 1, 2).is_err());
    }

    #[test]
    fn test_catalog_remove_keeps_identity_of_others() {
        let mut catalog = ProductCatalog::with_defaults();
        let id1 = catalog.find("Product 1").unwrap().id.clone();
        let id3 = catalog.find("Product 3").unwrap().id.clone();

        let removed = catalog.remove(&id1).unwrap();
        assert_eq!(removed.name, "Product 1");
        assert_eq!(catalog.len(), 4);

        // Row positions shifted, identity did not
        assert_eq!(catalog.find_by_id(&id3).unwrap().name, "Product 3");
        assert!(catalog.remove(&id1).is_none());
    }

    #[test]
    fn test_deserialized_duplicates_resolve_to_first_match() {
        let json = r#"[
            {"id": "a", "name": "Dup", "smallest_size": 5, "largest_size": 6},
            {"id": "b", "name": "Dup", "smallest_size": 20, "largest_size": 24},
            {"id": "c", "name": "Solo", "smallest_size": 1, "largest_size": 1}
        ]"#;
        let catalog: ProductCatalog = serde_json::from_str(json).unwrap();

        assert_eq!(catalog.find("Dup").unwrap().id, "a");
        assert_eq!(catalog.duplicate_names(), vec!["Dup".to_string()]);
    }
}
