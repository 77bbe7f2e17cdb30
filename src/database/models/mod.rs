pub mod card;
pub mod category;
pub mod feedback;
pub mod user;

pub use card::UserCard;
pub use category::{Category, CategoryType};
pub use feedback::Feedback;
pub use user::{Role, User, UserSummary};
