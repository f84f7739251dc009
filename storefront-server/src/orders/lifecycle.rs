//! 订单状态机
//!
//! ```text
//! pending    -> processing, cancelled
//! processing -> shipped, cancelled
//! shipped    -> delivered, cancelled
//! delivered  -> (terminal)
//! cancelled  -> (terminal)
//! ```

use crate::db::models::OrderStatus;

impl OrderStatus {
    /// Statuses reachable in one step from `self`
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Customers may cancel only before the order ships
    pub fn is_cancelable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}
