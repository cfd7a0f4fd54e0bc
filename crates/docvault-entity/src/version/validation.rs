//! Field validation for new document versions.
//!
//! Each function checks one field and returns the normalized value.
//! [`validate_new_version`] composes them in order.

use docvault_core::config::LedgerConfig;
use docvault_core::{AppError, AppResult};

use super::model::NewDocumentVersion;

/// Length of a SHA-256 hex digest.
pub const CHECKSUM_LENGTH: usize = 64;

/// Maximum length of a storage key or provider tag.
const MAX_LOCATOR_LENGTH: usize = 1024;

/// Explicit version numbers start at 1.
pub fn validate_version_number(version: i32) -> AppResult<i32> {
    if version < 1 {
        return Err(AppError::validation(format!(
            "Version number must be at least 1, got {version}"
        )));
    }
    Ok(version)
}

/// Filenames are non-blank, within the length limit, and free of path separators.
pub fn validate_filename(filename: &str, max_length: usize) -> AppResult<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Filename cannot be empty"));
    }
    if trimmed.chars().count() > max_length {
        return Err(AppError::validation(format!(
            "Filename exceeds {max_length} characters"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains('\0') {
        return Err(AppError::validation(format!(
            "Filename contains invalid characters: '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

/// MIME types are `type/subtype` with non-empty halves and no whitespace.
pub fn validate_mime_type(mime_type: &str) -> AppResult<String> {
    let normalized = mime_type.trim().to_lowercase();
    let valid = match normalized.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.contains('/')
                && !normalized.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!(
            "Invalid MIME type: '{mime_type}'"
        )));
    }
    Ok(normalized)
}

/// Sizes are positive and at most `max_size` bytes.
pub fn validate_size(size: i64, max_size: i64) -> AppResult<i64> {
    if size <= 0 {
        return Err(AppError::validation("File size must be positive"));
    }
    if size > max_size {
        return Err(AppError::validation(format!(
            "File size {size} exceeds maximum of {max_size} bytes"
        )));
    }
    Ok(size)
}

/// Checksums are 64 hex characters, returned lowercase.
pub fn normalize_checksum(checksum: &str) -> AppResult<String> {
    let trimmed = checksum.trim();
    if trimmed.len() != CHECKSUM_LENGTH || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::validation(format!(
            "Checksum must be {CHECKSUM_LENGTH} hexadecimal characters"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Tags are trimmed and lowercased; blanks are dropped and duplicates collapse
/// keeping first occurrence order. More than `max_tags` survivors is an error.
pub fn normalize_tags(tags: &[String], max_tags: usize) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        normalized.push(tag);
    }
    if normalized.len() > max_tags {
        return Err(AppError::validation(format!(
            "At most {max_tags} tags are allowed, got {}",
            normalized.len()
        )));
    }
    Ok(normalized)
}

/// Storage locators are non-blank and bounded.
pub fn validate_locator(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.len() > MAX_LOCATOR_LENGTH {
        return Err(AppError::validation(format!(
            "{field} exceeds {MAX_LOCATOR_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Metadata, when present, must be a JSON object.
pub fn validate_metadata(metadata: &serde_json::Value) -> AppResult<()> {
    if !metadata.is_object() {
        return Err(AppError::validation("Metadata must be a JSON object"));
    }
    Ok(())
}

/// Validate and normalize every field of a new version.
pub fn validate_new_version(
    input: NewDocumentVersion,
    config: &LedgerConfig,
) -> AppResult<NewDocumentVersion> {
    let version = input.version.map(validate_version_number).transpose()?;
    let filename = validate_filename(&input.filename, config.max_filename_length)?;
    let mime_type = validate_mime_type(&input.mime_type)?;
    let size = validate_size(input.size, config.max_file_size_bytes)?;
    let storage_key = validate_locator("Storage key", &input.storage_key)?;
    let storage_provider = validate_locator("Storage provider", &input.storage_provider)?;
    let checksum = input.checksum.as_deref().map(normalize_checksum).transpose()?;
    let tags = input
        .tags
        .as_deref()
        .map(|tags| normalize_tags(tags, config.max_tags))
        .transpose()?;
    if let Some(metadata) = &input.metadata {
        validate_metadata(metadata)?;
    }

    Ok(NewDocumentVersion {
        document_id: input.document_id,
        version,
        filename,
        mime_type,
        size,
        storage_key,
        storage_provider,
        checksum,
        tags,
        metadata: input.metadata,
        uploaded_by: input.uploaded_by,
    })
}
