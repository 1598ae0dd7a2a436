//! Domain and wire types shared across services and handlers.

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine};
pub use customer::{CustomerRecord, NewCustomer};
pub use order::{
    BillingAddress, FeeLine, LineItemDraft, MetaData, OrderDraft, OrderRecord, OrderStatus,
    OrderUpdate, PaymentMethod, ShippingAddress, ShippingLine,
};
pub use product::{Attribute, Product, ProductImage};
