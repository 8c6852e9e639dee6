//! API key stored as a single plain-text line.

use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};

/// Read the stored key. A missing or blank file means no key.
pub fn get_stored_api_key(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let key = fs::read_to_string(path)
        .map_err(|e| ReportError::Credential(format!("Could not read {}: {}", path.display(), e)))?;
    let key = key.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}

pub fn save_api_key_to_file(path: &Path, api_key: &str) -> Result<()> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(ReportError::Credential("Please enter an API Key".to_string()));
    }
    fs::write(path, key)
        .map_err(|e| ReportError::Credential(format!("Could not write {}: {}", path.display(), e)))?;
    log::info!("Saved API key to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_trimmed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_key.txt");
        assert_eq!(get_stored_api_key(&path).unwrap(), None);

        save_api_key_to_file(&path, "  abc123\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc123");
        assert_eq!(get_stored_api_key(&path).unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_file_counts_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_key.txt");
        fs::write(&path, "\n  \n").unwrap();
        assert_eq!(get_stored_api_key(&path).unwrap(), None);
    }

    #[test]
    fn empty_key_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_key.txt");
        assert!(save_api_key_to_file(&path, "   ").is_err());
        assert!(!path.exists());
    }
}
