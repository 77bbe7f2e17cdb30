use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CategoryType;

/// A user's private category. Same shape as `Category`, but the image is
/// kept inline and the name only has to be unique per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    /// Base64 payload, raw or as a `data:` URL.
    pub image: String,
}
