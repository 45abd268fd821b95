pub mod availability;
pub mod confirmation;
pub mod deposit;
pub mod lifecycle;
pub mod notifications;
pub mod payments;
pub mod phase;
pub mod pricing;
pub mod wizard;
