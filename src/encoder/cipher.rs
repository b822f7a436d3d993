use super::{EncodeError, Payload};
use std::fmt;

#[cfg(feature = "encryption")]
use aes::cipher::{AsyncStreamCipher, KeyIvInit};

#[cfg(feature = "encryption")]
type Aes128Cfb8Enc = cfb8::Encryptor<aes::Aes128>;
#[cfg(feature = "encryption")]
type Aes128Cfb8Dec = cfb8::Decryptor<aes::Aes128>;

/// AES-128 key and initialization vector, both supplied by configuration.
#[derive(Clone, PartialEq)]
pub struct CipherKey {
    key: [u8; 16],
    iv: [u8; 16],
}

impl CipherKey {
    pub fn new(key: [u8; 16], iv: [u8; 16]) -> Self {
        CipherKey { key, iv }
    }

    pub fn from_hex(key: &str, iv: &str) -> Result<Self, EncodeError> {
        Ok(CipherKey {
            key: decode_block("key", key)?,
            iv: decode_block("iv", iv)?,
        })
    }
}

/* Never print the key material */
impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey { .. }")
    }
}

fn decode_block(what: &'static str, hex_str: &str) -> Result<[u8; 16], EncodeError> {
    let bytes = hex::decode(hex_str.trim()).map_err(|e| EncodeError::InvalidKeyMaterial {
        what,
        reason: e.to_string(),
    })?;

    bytes.try_into().map_err(|b: Vec<u8>| EncodeError::InvalidKeyMaterial {
        what,
        reason: format!("expected 16 bytes, got {}", b.len()),
    })
}

fn payload_bytes(payload: &Payload) -> Result<Vec<u8>, EncodeError> {
    if payload.len() % 2 != 0 {
        return Err(EncodeError::OddLengthPayload(payload.len()));
    }
    hex::decode(payload.as_str()).map_err(|e| EncodeError::InvalidPayloadHex(e.to_string()))
}

/// Encrypts the bytes a hex payload stands for with AES-128-CFB8 and returns the
/// ciphertext as lowercase hex of the same length.
#[cfg(feature = "encryption")]
pub fn encrypt_payload(payload: &Payload, key: &CipherKey) -> Result<Payload, EncodeError> {
    let mut buf = payload_bytes(payload)?;
    Aes128Cfb8Enc::new(&key.key.into(), &key.iv.into()).encrypt(&mut buf);
    Ok(Payload::new(hex::encode(buf)))
}

#[cfg(feature = "encryption")]
pub fn decrypt_payload(ciphertext: &Payload, key: &CipherKey) -> Result<Payload, EncodeError> {
    let mut buf = payload_bytes(ciphertext)?;
    Aes128Cfb8Dec::new(&key.key.into(), &key.iv.into()).decrypt(&mut buf);
    Ok(Payload::new(hex::encode(buf)))
}

#[cfg(not(feature = "encryption"))]
pub fn encrypt_payload(payload: &Payload, _key: &CipherKey) -> Result<Payload, EncodeError> {
    payload_bytes(payload)?;
    Err(EncodeError::EncryptionUnavailable)
}

#[cfg(not(feature = "encryption"))]
pub fn decrypt_payload(ciphertext: &Payload, _key: &CipherKey) -> Result<Payload, EncodeError> {
    payload_bytes(ciphertext)?;
    Err(EncodeError::EncryptionUnavailable)
}
