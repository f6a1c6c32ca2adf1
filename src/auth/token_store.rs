use crate::auth::CredentialRecord;
use crate::utils::error::{AppError, AppResult};
use std::path::PathBuf;

/// Persists the credential record as a two-line plain-text file: the access
/// token on the first line and, when known, the refresh token on the second.
///
/// The file is opened, fully read or rewritten, and closed within a single
/// call; no handle is held across calls. Concurrent writers are not
/// supported — runs are expected to be invoked serially.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the stored record. A file without an access token line is
    /// corrupt; a missing refresh token line is tolerated (older records
    /// were written before refresh tokens were kept).
    pub fn load(&self) -> AppResult<CredentialRecord> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::ConfigIo(format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut lines = content.lines();

        let access_token = match lines.next() {
            Some(line) if !line.trim().is_empty() => line.trim().to_string(),
            _ => {
                return Err(AppError::CorruptCredential(format!(
                    "token file {} has no access token",
                    self.path.display()
                )));
            }
        };

        let refresh_token = lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string);

        Ok(CredentialRecord {
            access_token,
            refresh_token,
        })
    }

    /// Overwrites the stored record in full. A refreshed record replaces the
    /// old one entirely; the two are never merged.
    pub fn save(&self, record: &CredentialRecord) -> AppResult<()> {
        let mut content = record.access_token.clone();
        content.push('\n');
        if let Some(refresh_token) = &record.refresh_token {
            content.push_str(refresh_token);
            content.push('\n');
        }

        std::fs::write(&self.path, content).map_err(|e| {
            AppError::ConfigIo(format!(
                "Failed to write token file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
