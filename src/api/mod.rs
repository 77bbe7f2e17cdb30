pub mod extract;
pub mod views;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use views::{BudgetView, ProductView};
