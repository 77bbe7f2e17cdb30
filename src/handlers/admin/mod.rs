// handlers/admin/mod.rs - Admin handlers (token plus admin role)
//
// Routed behind jwt_auth_middleware and require_admin_middleware.

pub mod categories;
pub mod feedback;
pub mod users;

pub use categories::delete as category_delete;
pub use categories::post as category_post;
pub use categories::put as category_put;
pub use feedback::list as feedback_list;
pub use users::list as user_list;
pub use users::set_role as user_set_role;
