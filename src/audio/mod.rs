// Audio module - decoding uploaded and on-disk captures to mono samples

pub mod decode;

pub use decode::{decode_bytes, decode_file, downmix, DecodedAudio};
