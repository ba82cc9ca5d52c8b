//! Entity model: products, customers, and the orders that reference them.
//!
//! Entities are plain data holders. Equality and hashing are by `id` only, which is also the
//! identity used by the deduplicating pipeline stage.
//!
//! An [`Order`] shares its [`Customer`] and [`Product`]s through [`Arc`]: the same product
//! value is referenced by every order that contains it, and nothing in this crate mutates a
//! referenced entity in place.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Product`].
    ProductId
);
entity_id!(
    /// Identifier of a [`Customer`].
    CustomerId
);
entity_id!(
    /// Identifier of an [`Order`].
    OrderId
);

/// A product that can appear in any number of orders.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category label. Exact-case predicates treat `"Books"` and `"books"` as different.
    pub category: String,
    /// Non-negative unit price.
    pub price: f64,
}

impl Product {
    /// Create a product.
    ///
    /// Returns [`QueryError::PreconditionViolation`] if `price` is negative or not finite.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> QueryResult<Self> {
        let id = ProductId(id);
        if !price.is_finite() || price < 0.0 {
            return Err(QueryError::precondition(format!(
                "product {id} has invalid price {price}"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            category: category.into(),
            price: positive_zero(price),
        })
    }

    /// Returns a copy of this product with `price` replaced, clamped at zero.
    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price: positive_zero(price.max(0.0)),
            ..self.clone()
        }
    }
}

// `-0.0 + 0.0 == +0.0`; keeps equal prices equal under `f64::total_cmp`.
fn positive_zero(price: f64) -> f64 {
    price + 0.0
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product(id={}, name={}, category={}, price={})",
            self.id, self.name, self.category, self.price
        )
    }
}

/// A customer, classified by integer tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Rank used as a filter key (typically 1..=3).
    pub tier: i32,
}

impl Customer {
    /// Create a customer.
    pub fn new(id: u64, name: impl Into<String>, tier: i32) -> Self {
        Self {
            id: CustomerId(id),
            name: name.into(),
            tier,
        }
    }
}

impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Customer {}

impl Hash for Customer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Customer(id={}, name={}, tier={})",
            self.id, self.name, self.tier
        )
    }
}

/// An order placed by one customer for a sequence of products.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// The customer who placed the order.
    pub customer: Arc<Customer>,
    /// Calendar date the order was placed on.
    pub order_date: NaiveDate,
    /// Ordered products, in order-line order. May repeat a product.
    pub products: Vec<Arc<Product>>,
}

impl Order {
    /// Create an order.
    pub fn new(
        id: u64,
        customer: Arc<Customer>,
        order_date: NaiveDate,
        products: Vec<Arc<Product>>,
    ) -> Self {
        Self {
            id: OrderId(id),
            customer,
            order_date,
            products,
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order(id={}, customer={}, order_date={}, products=[",
            self.id, self.customer.id, self.order_date
        )?;
        for (i, p) in self.products.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p.id)?;
        }
        write!(f, "])")
    }
}
