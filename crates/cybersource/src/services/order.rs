//! Collaborators owned by the store: the order record and the shopper's cart.

use crate::types::{OrderMetaKey, OrderStatus};

pub trait OrderInterface {
    fn status(&self) -> OrderStatus;

    /// Move the order to `status`, recording `note` with the transition.
    fn update_status(&mut self, status: OrderStatus, note: &str);

    fn add_order_note(&mut self, note: &str);

    fn update_meta(&mut self, key: OrderMetaKey, value: &str);

    fn get_meta(&self, key: OrderMetaKey) -> Option<String>;

    /// Mark the order paid by the given processor transaction.
    fn payment_complete(&mut self, transaction_id: &str);
}

pub trait CartInterface {
    fn empty_cart(&mut self);
}
