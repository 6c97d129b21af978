use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AudioReference, AudioStore, StorageError};
use crate::audio::AudioClip;

#[derive(Default)]
pub struct InMemoryAudioStore {
    clips: RwLock<HashMap<AudioReference, AudioClip>>,
}

impl InMemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.clips.read().await.len()
    }
}

#[async_trait]
impl AudioStore for InMemoryAudioStore {
    async fn put(&self, clip: &AudioClip) -> Result<AudioReference, StorageError> {
        let reference = AudioReference::generate(clip);
        self.clips
            .write()
            .await
            .insert(reference.clone(), clip.clone());
        Ok(reference)
    }

    async fn get(&self, reference: &AudioReference) -> Result<AudioClip, StorageError> {
        self.clips
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(reference.to_string()))
    }

    async fn delete(&self, reference: &AudioReference) -> Result<(), StorageError> {
        self.clips
            .write()
            .await
            .remove(reference)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(reference.to_string()))
    }
}
