//! Domain layer: the payment record, its transition rules and the ports the
//! application layer depends on.

pub mod guard;
pub mod money;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod reconciliation;
pub mod validation;
