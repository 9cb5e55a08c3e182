pub mod debug;
pub mod payment;
