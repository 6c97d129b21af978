pub mod clip;
pub mod wav;

pub use clip::AudioClip;
