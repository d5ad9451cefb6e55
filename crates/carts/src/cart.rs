use serde::{Deserialize, Serialize};

use shopfront_core::{CartId, DomainError, DomainResult, Entity, ProductId};

/// One product line in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A shopping cart: ordered product lines, at most one line per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    products: Vec<CartLine>,
}

impl Cart {
    /// A new cart with no lines.
    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            products: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.products
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.products
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    /// Add one unit: bump an existing line or append a new one.
    pub fn add_product(&mut self, product_id: ProductId) {
        match self.products.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.products.push(CartLine {
                product_id,
                quantity: 1,
            }),
        }
    }

    /// Remove the whole line for `product_id`.
    pub fn remove_product(&mut self, product_id: ProductId) -> DomainResult<()> {
        let before = self.products.len();
        self.products.retain(|line| line.product_id != product_id);
        if self.products.len() == before {
            return Err(DomainError::not_found(format!(
                "product {product_id} in cart {}",
                self.id
            )));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }
}

impl Entity for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
