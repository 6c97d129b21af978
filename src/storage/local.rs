use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{AudioReference, AudioStore, StorageError};
use crate::audio::AudioClip;

/// Stores clips as `<uuid>.<ext>` files under a root directory.
pub struct LocalAudioStore {
    root: PathBuf,
}

impl LocalAudioStore {
    pub fn new(root: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&root)?;
        tracing::info!(root = %root.display(), "Local audio store ready");
        Ok(Self { root })
    }

    fn path_for(&self, reference: &AudioReference) -> PathBuf {
        self.root.join(reference.as_str())
    }
}

#[async_trait]
impl AudioStore for LocalAudioStore {
    async fn put(&self, clip: &AudioClip) -> Result<AudioReference, StorageError> {
        let reference = AudioReference::generate(clip);
        tokio::fs::write(self.path_for(&reference), &clip.bytes).await?;

        tracing::debug!(reference = %reference, bytes = clip.len(), "Audio stored");
        Ok(reference)
    }

    async fn get(&self, reference: &AudioReference) -> Result<AudioClip, StorageError> {
        let bytes = match tokio::fs::read(self.path_for(reference)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let content_type =
            AudioClip::content_type_for_extension(reference.extension().unwrap_or_default());
        Ok(AudioClip::new(bytes, content_type))
    }

    async fn delete(&self, reference: &AudioReference) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(reference)).await {
            Ok(()) => {
                tracing::debug!(reference = %reference, "Audio deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_clip_can_be_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path().join("audio")).unwrap();
        let clip = AudioClip::new(vec![0xFF, 0xFB, 0x90], "audio/mpeg");

        let reference = store.put(&clip).await.unwrap();
        assert!(dir.path().join("audio").join(reference.as_str()).exists());

        let fetched = store.get(&reference).await.unwrap();
        assert_eq!(fetched, clip);
    }

    #[tokio::test]
    async fn every_put_gets_a_fresh_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path().to_path_buf()).unwrap();
        let clip = AudioClip::new(vec![1, 2], "audio/wav");

        let first = store.put(&clip).await.unwrap();
        let second = store.put(&clip).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn deleted_clip_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path().to_path_buf()).unwrap();
        let reference = store.put(&AudioClip::new(vec![7], "audio/mpeg")).await.unwrap();

        store.delete(&reference).await.unwrap();

        assert!(!dir.path().join(reference.as_str()).exists());
        assert!(matches!(
            store.get(&reference).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&reference).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path().to_path_buf()).unwrap();
        let reference = AudioReference::parse("missing.mp3").unwrap();

        let result = store.get(&reference).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
