pub const CONTENT_TYPE_MPEG: &str = "audio/mpeg";
pub const CONTENT_TYPE_WAV: &str = "audio/wav";
const CONTENT_TYPE_OCTET: &str = "application/octet-stream";

/// Encoded audio as produced by a synthesizer and stored between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// File extension used when the clip is written to disk or uploaded.
    pub fn extension(&self) -> &'static str {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" | "audio/opus" => "ogg",
            "audio/flac" => "flac",
            "audio/webm" => "webm",
            _ => "bin",
        }
    }

    pub fn content_type_for_extension(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => CONTENT_TYPE_MPEG,
            "wav" => CONTENT_TYPE_WAV,
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "webm" => "audio/webm",
            _ => CONTENT_TYPE_OCTET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(AudioClip::new(vec![1], "audio/mpeg").extension(), "mp3");
        assert_eq!(AudioClip::new(vec![1], "audio/wav").extension(), "wav");
        assert_eq!(
            AudioClip::new(vec![1], "Audio/MPEG; charset=binary").extension(),
            "mp3"
        );
        assert_eq!(AudioClip::new(vec![1], "video/mp4").extension(), "bin");
    }

    #[test]
    fn content_type_roundtrips_through_extension() {
        for content_type in [CONTENT_TYPE_MPEG, CONTENT_TYPE_WAV, "audio/ogg", "audio/flac"] {
            let clip = AudioClip::new(vec![0], content_type);
            assert_eq!(
                AudioClip::content_type_for_extension(clip.extension()),
                content_type
            );
        }
        assert_eq!(
            AudioClip::content_type_for_extension("bin"),
            "application/octet-stream"
        );
    }
}
