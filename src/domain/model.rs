// ドメインモデル（集約と値オブジェクト）

mod cart;
mod order;
mod product;
mod value_objects;

pub use value_objects::{
    CartId, CartItemId, OrderId, ProductId, UserId,
    Money,
    CartItem, OrderItem,
    SelectedOptions,
    ShippingAddress,
    OrderStatus, PaymentMethod, PaymentResult,
    MAX_LINE_QUANTITY, MIN_LINE_QUANTITY,
};

pub use cart::{Cart, CartSummary};
pub use order::Order;
pub use product::{CustomSpec, Product, ProductSpecs};
