pub mod factory;
pub mod identity;
pub mod payment;
pub mod repositories;
