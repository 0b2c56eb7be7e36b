mod decoder;
mod symphonia_converter;

pub use decoder::{decode_to_mono_pcm, TARGET_SAMPLE_RATE};
pub use symphonia_converter::SymphoniaConverter;
