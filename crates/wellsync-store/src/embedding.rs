//! Vector blob encoding and normalization for stored fault embeddings.
//!
//! Embeddings are persisted as little-endian float32 bytes so similarity
//! scores computed after a reload match the ones computed at write time.

use ndarray::Array1;

/// Encode a float32 vector as little-endian bytes.
pub fn encode_f32(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode little-endian float32 bytes. Returns `None` if the length is not a multiple of 4.
pub fn decode_f32(bytes: &[u8]) -> Option<Array1<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(Array1::from_iter(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
    ))
}

/// Scale a vector to unit length. Near-zero vectors yield `None`.
pub fn normalized(embedding: &Array1<f32>) -> Option<Array1<f32>> {
    let norm = embedding.dot(embedding).sqrt();
    if norm < 1e-9 || !norm.is_finite() {
        return None;
    }
    Some(embedding / norm)
}
