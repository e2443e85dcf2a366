use crate::error::SiteKeyError;
use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Standard-alphabet codec for key material. Decoding accepts input with or
/// without trailing padding and ignores embedded whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Processor;

impl Base64Processor {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    #[inline]
    pub fn encode(&self, data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    pub fn decode(&self, encoded: &str) -> Result<Vec<u8>, SiteKeyError> {
        if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
            let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            return Ok(LENIENT.decode(compact)?);
        }
        Ok(LENIENT.decode(encoded)?)
    }
}
