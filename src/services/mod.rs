pub mod catalog_service;
pub mod feedback_service;
pub mod ledger_service;
pub mod user_service;
