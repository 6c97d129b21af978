// RIFF/WAVE container for raw 16-bit little-endian PCM.
//
// ElevenLabs `pcm_*` output formats return headerless samples; the
// transcription vendors only accept a real container, so the clip is wrapped
// before it is stored.

pub const WAV_HEADER_LEN: usize = 44;

pub fn encode_pcm16_le(pcm: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
    let channels = channels.max(1);
    // A trailing odd byte cannot form a sample.
    let data = &pcm[..pcm.len() - pcm.len() % 2];
    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    let file_size = (36 + data.len()) as u32;
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * channels as u32 * 2;
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&(channels * 2).to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data.len() as u32).to_le_bytes());
    wav.extend_from_slice(data);

    wav
}

/// Parses the sample rate out of an ElevenLabs output format such as `pcm_16000`.
pub fn pcm_sample_rate(output_format: &str) -> Option<u32> {
    output_format
        .strip_prefix("pcm_")
        .and_then(|rate| rate.parse::<u32>().ok())
        .filter(|rate| *rate > 0)
}
