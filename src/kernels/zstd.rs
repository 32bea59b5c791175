//! Zstandard compression for individual column buffers.
//!
//! The file manifest records each buffer's uncompressed length, so frames are
//! written without a size prefix and decompression is bounded by the recorded
//! length.

use crate::error::{FeatherError, Result};

/// Compresses one buffer at the given level. Empty input stays empty.
pub fn compress(input_bytes: &[u8], level: i32) -> Result<Vec<u8>> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }
    ::zstd::bulk::compress(input_bytes, level).map_err(|e| FeatherError::ZstdError(e.to_string()))
}

/// Decompresses one buffer that must expand to exactly `uncompressed_len` bytes.
pub fn decompress(input_bytes: &[u8], uncompressed_len: usize) -> Result<Vec<u8>> {
    if input_bytes.is_empty() {
        if uncompressed_len == 0 {
            return Ok(Vec::new());
        }
        return Err(FeatherError::ZstdError(format!(
            "empty frame cannot expand to {} bytes",
            uncompressed_len
        )));
    }

    // The frame header carries its own content size; a disagreement means a
    // corrupt manifest or frame, so nothing is allocated for it.
    match ::zstd::zstd_safe::get_frame_content_size(input_bytes) {
        Ok(Some(size)) if size != uncompressed_len as u64 => {
            return Err(FeatherError::ZstdError(format!(
                "frame declares {} bytes, manifest declares {}",
                size, uncompressed_len
            )));
        }
        Ok(_) => {}
        Err(_) => {
            return Err(FeatherError::ZstdError(
                "input is not a zstd frame".to_string(),
            ));
        }
    }

    let decompressed = ::zstd::bulk::decompress(input_bytes, uncompressed_len)
        .map_err(|e| FeatherError::ZstdError(e.to_string()))?;

    if decompressed.len() != uncompressed_len {
        return Err(FeatherError::ZstdError(format!(
            "Decompressed size does not match manifest. Expected {}, got {}.",
            uncompressed_len,
            decompressed.len()
        )));
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip_highly_compressible_data() {
        let original = vec![42u8; 10_000];
        let compressed = compress(&original, 3).unwrap();
        assert!(compressed.len() < 100);
        assert_eq!(decompress(&compressed, original.len()).unwrap(), original);
    }

    #[test]
    fn test_zstd_wrong_expected_length() {
        let original = b"hello world, hello world, hello world".to_vec();
        let compressed = compress(&original, 1).unwrap();
        let result = decompress(&compressed, original.len() + 5);
        assert!(matches!(result, Err(FeatherError::ZstdError(_))));
    }

    #[test]
    fn test_zstd_garbage_input() {
        let result = decompress(&[1, 2, 3, 4, 5], 16);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Zstd"));
    }

    #[test]
    fn test_zstd_empty() {
        assert!(compress(&[], 3).unwrap().is_empty());
        assert!(decompress(&[], 0).unwrap().is_empty());
        assert!(decompress(&[], 4).is_err());
    }
}
