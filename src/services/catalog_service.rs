use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Category, CategoryType, UserCard};
use crate::database::Store;
use crate::error::ApiError;
use crate::state::AppState;

/// Extensions accepted for uploaded category images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL prefix the uploads directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// An image file taken from a multipart body
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Category fields as submitted. Create requires all three, update takes any subset.
#[derive(Debug, Default, Clone)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Card fields as submitted
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct CardDraft {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
}

pub struct CatalogService {
    store: Arc<dyn Store>,
    upload_dir: PathBuf,
    max_inline_image_bytes: usize,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, upload_dir: impl Into<PathBuf>, max_inline_image_bytes: usize) -> Self {
        Self {
            store,
            upload_dir: upload_dir.into(),
            max_inline_image_bytes,
        }
    }

    /// Store and upload limits as configured for the running server
    pub fn from_state(state: &AppState) -> Self {
        let uploads = &state.config.uploads;
        Self::new(state.store.clone(), &uploads.dir, uploads.max_inline_image_bytes)
    }

    // Global categories

    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, ApiError> {
        let name = validate_name(draft.name.as_deref())?;
        let kind = parse_kind(draft.kind.as_deref())?;
        let upload = draft.image.ok_or_else(|| ApiError::field("image", "Image file is required"))?;
        let image = save_image(&self.upload_dir, &upload).await?;

        let category = Category {
            id: Uuid::new_v4(),
            name,
            kind,
            image,
        };
        let category = self.store.insert_category(category).await?;
        tracing::info!("Created category '{}' ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> Result<Category, ApiError> {
        let mut category = self
            .store
            .find_category(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        if draft.name.is_some() {
            category.name = validate_name(draft.name.as_deref())?;
        }
        if draft.kind.is_some() {
            category.kind = parse_kind(draft.kind.as_deref())?;
        }
        if let Some(upload) = draft.image.as_ref() {
            category.image = save_image(&self.upload_dir, upload).await?;
        }

        self.store.update_category(&category).await?;
        Ok(category)
    }

    /// Budget entries pointing at the category are left alone and read back as null.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_category(id).await? {
            return Err(ApiError::not_found("Category not found"));
        }
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    // Per-user cards

    pub async fn create_card(&self, owner: Uuid, draft: CardDraft) -> Result<UserCard, ApiError> {
        let name = validate_name(draft.name.as_deref())?;
        let kind = parse_kind(draft.kind.as_deref())?;
        let image = draft.image.ok_or_else(|| ApiError::field("image", "Image is required"))?;
        validate_inline_image(&image, self.max_inline_image_bytes).map_err(|m| ApiError::field("image", m))?;

        let card = UserCard {
            id: Uuid::new_v4(),
            owner_user_id: owner,
            name,
            kind,
            image,
        };
        Ok(self.store.insert_card(card).await?)
    }

    pub async fn list_cards(&self, owner: Uuid) -> Result<Vec<UserCard>, ApiError> {
        Ok(self.store.list_cards(owner).await?)
    }

    pub async fn update_card(&self, owner: Uuid, id: Uuid, draft: CardDraft) -> Result<UserCard, ApiError> {
        let mut card = self
            .store
            .find_card(owner, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Card not found"))?;

        if draft.name.is_some() {
            card.name = validate_name(draft.name.as_deref())?;
        }
        if draft.kind.is_some() {
            card.kind = parse_kind(draft.kind.as_deref())?;
        }
        if let Some(image) = draft.image {
            validate_inline_image(&image, self.max_inline_image_bytes).map_err(|m| ApiError::field("image", m))?;
            card.image = image;
        }

        self.store.update_card(&card).await?;
        Ok(card)
    }

    pub async fn delete_card(&self, owner: Uuid, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_card(owner, id).await? {
            return Err(ApiError::not_found("Card not found"));
        }
        Ok(())
    }
}

fn validate_name(name: Option<&str>) -> Result<String, ApiError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ApiError::field("name", "Name is required")),
    }
}

fn parse_kind(kind: Option<&str>) -> Result<CategoryType, ApiError> {
    kind.ok_or_else(|| ApiError::field("type", "Type is required"))?
        .parse()
        .map_err(|m: String| ApiError::field("type", m))
}

/// Lower-cased extension of an uploaded file name, if it is an allowed image type
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Write the image under its SHA-256 name and return the public URL. Identical
/// uploads land on the same file.
pub async fn save_image(dir: &Path, upload: &ImageUpload) -> Result<String, ApiError> {
    if upload.bytes.is_empty() {
        return Err(ApiError::field("image", "Image file is empty"));
    }

    let ext = upload
        .file_name
        .as_deref()
        .and_then(image_extension)
        .ok_or_else(|| ApiError::field("image", format!("Image must be one of: {}", IMAGE_EXTENSIONS.join(", "))))?;

    let file_name = format!("{:x}.{}", Sha256::digest(&upload.bytes), ext);
    let path = dir.join(&file_name);

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Cannot create upload directory {}: {}", dir.display(), e);
        ApiError::internal_server_error("Failed to store image")
    })?;
    tokio::fs::write(&path, &upload.bytes).await.map_err(|e| {
        tracing::error!("Cannot write upload {}: {}", path.display(), e);
        ApiError::internal_server_error("Failed to store image")
    })?;

    tracing::debug!("Stored image {} ({} bytes)", file_name, upload.bytes.len());
    Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
}

/// Accepts raw base64 or a `data:<mime>;base64,` URL
pub fn validate_inline_image(image: &str, max_bytes: usize) -> Result<(), String> {
    let payload = match image.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or("Malformed data URL")?;
            if !meta.ends_with(";base64") {
                return Err("Data URL must be base64 encoded".to_string());
            }
            data
        }
        None => image,
    };

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|_| "Image is not valid base64".to_string())?;

    if decoded.is_empty() {
        return Err("Image is empty".to_string());
    }
    if decoded.len() > max_bytes {
        return Err(format!("Image exceeds {} bytes", max_bytes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("budget-uploads-{}", Uuid::new_v4()))
    }

    fn service(dir: &Path) -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()), dir, 1024)
    }

    fn png(bytes: &'static [u8]) -> ImageUpload {
        ImageUpload {
            file_name: Some("food.PNG".into()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn extension_filter() {
        assert_eq!(image_extension("a.PNG").as_deref(), Some("png"));
        assert_eq!(image_extension("a.svg"), None);
        assert_eq!(image_extension("a.exe"), None);
        assert_eq!(image_extension("noext"), None);
    }

    #[test]
    fn inline_image_forms() {
        assert!(validate_inline_image(PIXEL, 1024).is_ok());
        assert!(validate_inline_image(&format!("data:image/png;base64,{}", PIXEL), 1024).is_ok());
        assert!(validate_inline_image("data:image/png,plain", 1024).is_err());
        assert!(validate_inline_image("not base64!!", 1024).is_err());
        assert!(validate_inline_image(PIXEL, 10).is_err());
    }

    #[tokio::test]
    async fn category_image_is_content_addressed() {
        let dir = temp_dir();
        let catalog = service(&dir);

        let draft = CategoryDraft {
            name: Some(" Food ".into()),
            kind: Some("Expenses".into()),
            image: Some(png(b"fake-png")),
        };
        let food = catalog.create_category(draft).await.unwrap();
        assert_eq!(food.name, "Food");
        assert!(food.image.starts_with("/uploads/") && food.image.ends_with(".png"));

        let stored = food.image.trim_start_matches("/uploads/");
        assert_eq!(tokio::fs::read(dir.join(stored)).await.unwrap(), b"fake-png");

        let again = CategoryDraft {
            name: Some("Groceries".into()),
            kind: Some("Expenses".into()),
            image: Some(png(b"fake-png")),
        };
        assert_eq!(catalog.create_category(again).await.unwrap().image, food.image);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn category_create_requires_every_field() {
        let dir = temp_dir();
        let catalog = service(&dir);

        let missing_image = CategoryDraft {
            name: Some("Food".into()),
            kind: Some("Expenses".into()),
            image: None,
        };
        assert_eq!(
            catalog.create_category(missing_image).await.unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );

        let bad_type = CategoryDraft {
            name: Some("Food".into()),
            kind: Some("Savings".into()),
            image: Some(png(b"x")),
        };
        assert!(catalog.create_category(bad_type).await.is_err());
    }

    #[tokio::test]
    async fn category_update_and_delete() {
        let dir = temp_dir();
        let catalog = service(&dir);
        let salary = catalog
            .create_category(CategoryDraft {
                name: Some("Salary".into()),
                kind: Some("Revenues".into()),
                image: Some(png(b"salary")),
            })
            .await
            .unwrap();

        let renamed = catalog
            .update_category(salary.id, CategoryDraft { name: Some("Wages".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Wages");
        assert_eq!(renamed.image, salary.image);

        catalog.delete_category(salary.id).await.unwrap();
        let err = catalog.delete_category(salary.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn cards_are_private_and_unique_per_owner() {
        let catalog = service(&temp_dir());
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let draft = CardDraft {
            name: Some("Side gig".into()),
            kind: Some("Revenues".into()),
            image: Some(PIXEL.into()),
        };

        let card = catalog.create_card(alice, draft.clone()).await.unwrap();
        assert!(catalog.create_card(alice, draft.clone()).await.is_err());
        assert!(catalog.create_card(bob, draft).await.is_ok());

        let err = catalog
            .update_card(bob, card.id, CardDraft { name: Some("Mine".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(catalog.delete_card(bob, card.id).await.unwrap_err().status_code(), StatusCode::NOT_FOUND);

        assert_eq!(catalog.list_cards(alice).await.unwrap().len(), 1);
        catalog.delete_card(alice, card.id).await.unwrap();
        assert!(catalog.list_cards(alice).await.unwrap().is_empty());
    }
}
