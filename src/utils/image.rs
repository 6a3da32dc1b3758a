use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::error::ApiError;

const ALLOWED_TYPES: [&str; 4] = ["jpg", "jpeg", "gif", "png"];

/// Decodes a `data:image/<subtype>;base64,<payload>` string and writes it
/// under `<public_dir>/images/`. Returns the relative path stored on the
/// survey row. Nothing is written when validation or decoding fails.
pub fn store(public_dir: &str, data_uri: &str) -> Result<String, ApiError> {
    let rest = data_uri
        .strip_prefix("data:image/")
        .ok_or(ApiError::InvalidImageFormat)?;

    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or(ApiError::InvalidImageFormat)?;

    let subtype = subtype.to_lowercase();
    if !ALLOWED_TYPES.contains(&subtype.as_str()) {
        return Err(ApiError::InvalidImageFormat);
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ApiError::InvalidImageEncoding)?;

    let dir = Path::new(public_dir).join("images");
    fs::create_dir_all(&dir)?;

    let file = format!("{}.{}", Uuid::new_v4().simple(), subtype);
    fs::write(dir.join(&file), &bytes)?;

    Ok(format!("images/{file}"))
}

/// Stores the new image first; the old file is only removed after the new
/// one is safely on disk. Removal is best-effort.
pub fn replace(
    public_dir: &str,
    old_path: Option<&str>,
    data_uri: &str,
) -> Result<String, ApiError> {
    let path = store(public_dir, data_uri)?;

    if let Some(old_path) = old_path {
        delete(public_dir, old_path);
    }

    Ok(path)
}

/// Best-effort removal. A missing file is not an error.
pub fn delete(public_dir: &str, relative_path: &str) {
    let absolute = Path::new(public_dir).join(relative_path);

    if let Err(error) = fs::remove_file(&absolute) {
        if error.kind() != std::io::ErrorKind::NotFound {
            log::warn!("failed to remove image {relative_path}: {error}");
        }
    }
}
