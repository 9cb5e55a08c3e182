pub mod cart;
pub mod catalog;
pub mod errors;
pub mod payment;
pub mod ports;
pub mod pricing;
