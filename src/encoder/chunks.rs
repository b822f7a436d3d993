use super::{EncodeError, Payload};
use log::debug;

/// Ordered uplink frames cut from one payload; iterate as often as needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkSequence {
    chunks: Vec<String>,
}

impl ChunkSequence {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).map(|c| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.as_str())
    }

    /// Joins the chunks back into the payload they were cut from.
    pub fn concat(&self) -> String {
        self.chunks.concat()
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Splits the payload into consecutive pieces of `chunk_length` characters, the last
/// one possibly shorter.
pub fn chunk_payload(payload: &Payload, chunk_length: usize) -> Result<ChunkSequence, EncodeError> {
    if chunk_length == 0 {
        return Err(EncodeError::InvalidChunkLength);
    }

    let chars: Vec<char> = payload.as_str().chars().collect();
    let chunks: Vec<String> = chars
        .chunks(chunk_length)
        .map(|c| c.iter().collect())
        .collect();

    debug!("Payload of {} characters split into {} chunks", chars.len(), chunks.len());
    Ok(ChunkSequence { chunks })
}
