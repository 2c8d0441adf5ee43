use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions, try_exists};
use tokio::io::AsyncWriteExt;

use crate::constants::LOG_RECORD_SEPARATOR;

pub async fn ensure_unique_file_name(dir: &Path, original: &str) -> Result<String, String> {
    if !try_exists(dir.join(original))
        .await
        .map_err(|err| format!("Failed to verify file existence: {}", err))?
    {
        return Ok(original.to_string());
    }

    let original_path = Path::new(original);
    let stem = original_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    let extension = original_path.extension().and_then(|ext| ext.to_str());

    let mut counter = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };

        if !try_exists(dir.join(&candidate))
            .await
            .map_err(|err| format!("Failed to verify file existence: {}", err))?
        {
            return Ok(candidate);
        }

        counter += 1;
    }
}

pub fn resolve_mime_type(candidate: Option<&str>, path: &Path) -> String {
    if let Some(value) = candidate {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\'])
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return None;
    }

    Some(trimmed.to_string())
}

pub fn default_extension_for_mime(mime_type: &str) -> Option<String> {
    let mime = mime_type.trim().to_lowercase();
    let ext = match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    };

    if let Some(value) = ext {
        return Some(value.to_string());
    }

    mime.split('/')
        .nth(1)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// Appends one record followed by the record separator, creating the
/// directory and file on first use.
pub async fn append_log_record(dir: &Path, file_name: &str, record: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
    file.write_all(format!("{record}{LOG_RECORD_SEPARATOR}").as_bytes()).await?;
    file.flush().await?;
    Ok(path)
}

/// Writes bytes under `dir` using a sanitized, collision-free name.
pub async fn write_output_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, String> {
    let sanitized = sanitize_file_name(file_name)
        .ok_or_else(|| format!("Invalid file name supplied: {}", file_name))?;

    if !try_exists(dir)
        .await
        .map_err(|err| format!("Failed to check directory '{}': {}", dir.display(), err))?
    {
        fs::create_dir_all(dir)
            .await
            .map_err(|err| format!("Unable to create directory '{}': {}", dir.display(), err))?;
    }

    let unique_name = ensure_unique_file_name(dir, &sanitized).await?;
    let target_path = dir.join(&unique_name);
    fs::write(&target_path, bytes)
        .await
        .map_err(|err| format!("Unable to write file '{}': {}", unique_name, err))?;

    Ok(target_path)
}
