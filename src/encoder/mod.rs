use crate::config::{MaskPolicy, PayloadConfig};
use crate::extractor::ReadingSet;
use crate::registers::{RegisterClass, RegisterKind};
use log::{debug, info};
use std::fmt;
use thiserror::Error;

pub mod chunks;
pub mod cipher;

pub use chunks::{chunk_payload, ChunkSequence};
pub use cipher::{decrypt_payload, encrypt_payload, CipherKey};

#[derive(Error, Debug, PartialEq)]
pub enum EncodeError {
    #[error("Register {register} has no reading")]
    MissingReading { register: RegisterKind },
    #[error("Register {register} has negative magnitude {value} which cannot be sent unmasked")]
    NegativeMagnitude { register: RegisterKind, value: i128 },
    #[error("Payload has odd length {0} and cannot be converted to bytes")]
    OddLengthPayload(usize),
    #[error("Payload is not a hex string: {0}")]
    InvalidPayloadHex(String),
    #[error("Chunk length must be at least 1")]
    InvalidChunkLength,
    #[error("Invalid cipher {what}: {reason}")]
    InvalidKeyMaterial { what: &'static str, reason: String },
    #[error("Encryption support is not compiled in")]
    EncryptionUnavailable,
}

/// Hex string sent to the modem, in plaintext or ciphertext form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    pub fn new(hex: impl Into<String>) -> Self {
        Payload(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keeps the lowest `width` bits, negative values wrap as two's complement.
pub fn mask_value(value: i128, width: u32) -> u128 {
    let v = value as u128;
    if width >= 128 {
        return v;
    }
    v & ((1u128 << width) - 1)
}

/// Lowercase hex without prefix or padding, 255 renders as "ff" and 1 as "1".
pub fn render_hex(value: u128) -> String {
    format!("{:x}", value)
}

/// Drops whitespace and separator characters, then the last `truncate` characters.
pub fn normalize_timestamp(timestamp: &str, separators: &str, truncate: usize) -> String {
    let stripped: Vec<char> = timestamp
        .chars()
        .filter(|c| !c.is_whitespace() && !separators.contains(*c))
        .collect();

    let keep = stripped.len().saturating_sub(truncate);
    stripped[..keep].iter().collect()
}

fn render_magnitude(register: RegisterKind, value: i128, settings: &PayloadConfig) -> Result<String, EncodeError> {
    let widths = &settings.mask_widths;
    match settings.masking {
        MaskPolicy::Masked => {
            let width = match register.class() {
                RegisterClass::Energy => widths.energy,
                _ => widths.instantaneous,
            };
            Ok(render_hex(mask_value(value, width)))
        }
        MaskPolicy::Unmasked => {
            if value < 0 {
                return Err(EncodeError::NegativeMagnitude { register, value });
            }
            Ok(render_hex(value as u128))
        }
    }
}

/// Concatenates the timestamp and every register's magnitude and scale in payload order.
pub fn encode_payload(readings: &ReadingSet, settings: &PayloadConfig) -> Result<Payload, EncodeError> {
    let mut payload = normalize_timestamp(
        &readings.timestamp,
        &settings.timestamp_separators,
        settings.timestamp_truncate,
    );

    for register in RegisterKind::PAYLOAD_ORDER {
        let reading = readings
            .get(register)
            .ok_or(EncodeError::MissingReading { register })?;

        let magnitude = render_magnitude(register, reading.magnitude, settings)?;
        /* Scale bytes are masked in every variant */
        let scale = render_hex(mask_value(reading.scale, settings.mask_widths.scale));
        debug!("{}: {} {}", register, magnitude, scale);

        payload.push_str(&magnitude);
        payload.push_str(&scale);
    }

    info!("Encoded payload of {} characters", payload.len());
    Ok(Payload(payload))
}
