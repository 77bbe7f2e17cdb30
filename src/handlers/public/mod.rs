// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, health, and token acquisition.

pub mod root;
pub mod users;

pub use root::health;
pub use root::root;
pub use users::login as users_login;
pub use users::signup as users_signup;
