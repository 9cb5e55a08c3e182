pub mod checkout_service;
pub mod diagnostics_service;
