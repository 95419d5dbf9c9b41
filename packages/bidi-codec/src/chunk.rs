//! Payload Chunking
//!
//! File uploads are limited per transaction, so bytecode is appended in
//! pieces of at most [`MAX_CHUNK_SIZE`] units.

use crate::error::CodecError;

/// Largest piece sent in a single file append
pub const MAX_CHUNK_SIZE: usize = 4000;

/// Split a payload into ordered, non-overlapping slices of at most `max_size`
///
/// The returned iterator is lazy and can be cloned to restart it. Every
/// slice has `max_size` elements except possibly the last, and an empty
/// payload yields no slices.
pub fn chunk<T>(payload: &[T], max_size: usize) -> Result<std::slice::Chunks<'_, T>, CodecError> {
    if max_size == 0 {
        return Err(CodecError::Validation(
            "chunk size must be greater than zero".to_string(),
        ));
    }
    Ok(payload.chunks(max_size))
}

/// Number of chunks [`chunk`] yields for a payload of `len` units
pub fn chunk_count(len: usize, max_size: usize) -> usize {
    if max_size == 0 {
        return 0;
    }
    len.div_ceil(max_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_lengths() {
        let payload = vec![0xabu8; 8500];
        let chunks = chunk(&payload, MAX_CHUNK_SIZE).unwrap();

        let lengths: Vec<usize> = chunks.clone().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![4000, 4000, 500]);
        assert_eq!(chunks.len(), chunk_count(payload.len(), MAX_CHUNK_SIZE));
        assert_eq!(chunks.collect::<Vec<_>>().concat(), payload);
    }

    #[test]
    fn test_chunk_exact_multiple() {
        let payload = "ab".repeat(4000);
        let lengths: Vec<usize> = chunk(payload.as_bytes(), MAX_CHUNK_SIZE)
            .unwrap()
            .map(|c| c.len())
            .collect();
        assert_eq!(lengths, vec![4000, 4000]);
    }

    #[test]
    fn test_chunk_restartable() {
        let payload: Vec<u32> = (0..10).collect();
        let chunks = chunk(&payload, 3).unwrap();

        let first: Vec<&[u32]> = chunks.clone().collect();
        let second: Vec<&[u32]> = chunks.collect();
        assert_eq!(first, second);
        assert_eq!(first.last().copied(), Some(&[9u32][..]));
    }

    #[test]
    fn test_chunk_empty_payload() {
        let payload: [u8; 0] = [];
        assert_eq!(chunk(&payload, MAX_CHUNK_SIZE).unwrap().count(), 0);
        assert_eq!(chunk_count(0, MAX_CHUNK_SIZE), 0);
    }

    #[test]
    fn test_chunk_zero_size_rejected() {
        assert!(chunk(b"abc", 0).is_err());
    }
}
