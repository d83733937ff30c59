//! Recipe image storage.
//!
//! Uploaded images are written below the configured `media_root` under a fixed
//! prefix, with a filename generated fresh for every upload so storage paths
//! never collide and never depend on the client-supplied filename. Only the
//! extension of the original name is preserved.

use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::errors::Error;

/// Fixed path prefix for recipe images, relative to `media_root`.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Derive the storage path for an uploaded recipe image.
///
/// The path is `uploads/recipe/<unique_id>.<extension>` where the extension is
/// taken verbatim from the original filename's suffix. A filename without a
/// suffix yields a path without one.
pub fn recipe_image_path(unique_id: &str, original_filename: &str) -> String {
    match Path::new(original_filename).extension().and_then(|e| e.to_str()) {
        Some(extension) => format!("{RECIPE_IMAGE_DIR}/{unique_id}.{extension}"),
        None => format!("{RECIPE_IMAGE_DIR}/{unique_id}"),
    }
}

/// Persist an uploaded recipe image and return its path relative to
/// `media_root`.
pub async fn save_recipe_image(media_root: &Path, original_filename: &str, data: &[u8]) -> Result<String, Error> {
    let relative_path = recipe_image_path(&Uuid::new_v4().to_string(), original_filename);
    let absolute_path = media_root.join(&relative_path);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| Error::Internal {
            operation: format!("create media directory: {e}"),
        })?;
    }

    fs::write(&absolute_path, data).await.map_err(|e| Error::Internal {
        operation: format!("write recipe image: {e}"),
    })?;

    Ok(relative_path)
}
