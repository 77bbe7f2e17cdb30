// handlers/protected/mod.rs - Protected handlers (token required)
//
// Every handler here receives the caller as `Extension<AuthUser>` from
// jwt_auth_middleware and only ever touches that user's data.

pub mod budget;
pub mod cards;
pub mod categories;
pub mod feedback;
pub mod home;
pub mod profile;

pub use budget::delete as budget_delete;
pub use budget::get as budget_get;
pub use budget::post as budget_post;
pub use budget::put as budget_put;
pub use budget::summary as budget_summary;

pub use cards::delete as card_delete;
pub use cards::list as card_list;
pub use cards::post as card_post;
pub use cards::put as card_put;

pub use categories::list as category_list;
pub use feedback::post as feedback_post;
pub use home::get as home_get;
pub use profile::put as profile_put;
