// Blob storage for generated audio.
//
// Every attempt persists its audio and records only the opaque reference;
// callers fetch the bytes back through the same store.

mod local;
mod memory;

pub use local::LocalAudioStore;
pub use memory::InMemoryAudioStore;

use crate::audio::AudioClip;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque handle to a stored clip, e.g. `3f2a...c1.mp3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioReference(String);

impl AudioReference {
    /// Accepts `[A-Za-z0-9._-]+` that does not start with a dot, so a
    /// reference can never escape the store's root.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StorageError::InvalidReference(raw.to_string()))
        }
    }

    pub(crate) fn generate(clip: &AudioClip) -> Self {
        Self(format!("{}.{}", uuid::Uuid::new_v4().simple(), clip.extension()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension part of the reference, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl fmt::Display for AudioReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("audio not found: {0}")]
    NotFound(String),

    #[error("invalid audio reference: {0}")]
    InvalidReference(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn put(&self, clip: &AudioClip) -> Result<AudioReference, StorageError>;

    async fn get(&self, reference: &AudioReference) -> Result<AudioClip, StorageError>;

    /// Removes a stored clip. Unknown references are `NotFound`.
    async fn delete(&self, reference: &AudioReference) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_cannot_traverse_paths() {
        assert!(AudioReference::parse("abc123.mp3").is_ok());
        assert!(AudioReference::parse("a_b-c.wav").is_ok());
        assert!(AudioReference::parse("").is_err());
        assert!(AudioReference::parse("../etc/passwd").is_err());
        assert!(AudioReference::parse(".hidden").is_err());
        assert!(AudioReference::parse("dir/file.mp3").is_err());
        assert!(AudioReference::parse("dir\\file.mp3").is_err());
    }

    #[test]
    fn generated_references_carry_the_clip_extension() {
        let clip = AudioClip::new(vec![1], "audio/wav");
        let reference = AudioReference::generate(&clip);
        assert_eq!(reference.extension(), Some("wav"));
        assert!(AudioReference::parse(reference.as_str()).is_ok());
    }

    #[test]
    fn serializes_as_plain_string() {
        let reference = AudioReference::parse("abc.mp3").unwrap();
        assert_eq!(serde_json::to_string(&reference).unwrap(), "\"abc.mp3\"");
    }
}
