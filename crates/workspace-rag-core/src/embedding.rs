//! Hashing-trick embedder and vector utilities.
//!
//! [`HashEmbedder`] maps text to a fixed-dimension, L2-normalized vector
//! without any model: every token is hashed with 32-bit FNV-1a into one of
//! `dims` buckets, one hash bit picks the sign, and the signed counts are
//! normalized. Collisions are expected and tolerated.
//!
//! The function depends only on the text and `dims`, never on the process,
//! platform, or run, so vectors written at index time stay comparable with
//! query vectors computed later.
//!
//! Vectors are persisted as JSON arrays ([`encode_vector`] /
//! [`decode_vector`]) to keep the store introspectable.

use crate::error::{CoreError, Result};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the Unicode code points of `token`.
///
/// # Example
///
/// ```rust
/// use workspace_rag_core::embedding::fnv1a_32;
///
/// assert_eq!(fnv1a_32(""), 2_166_136_261);
/// assert_eq!(fnv1a_32("a"), 0xe40c_292c);
/// ```
pub fn fnv1a_32(token: &str) -> u32 {
    token.chars().fold(FNV_OFFSET_BASIS, |h, ch| {
        (h ^ ch as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Lowercase `text` and split it into maximal runs of alphanumeric or `_`
/// characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deterministic bag-of-tokens embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    /// Fails when `dims` is zero.
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(CoreError::InvalidConfig(
                "embedding dims must be > 0".to_string(),
            ));
        }
        Ok(Self { dims })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Embed `text` into a unit vector, or the zero vector when it has no tokens.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            let h = fnv1a_32(&token);
            let idx = (h as usize) % self.dims;
            let sign = if (h >> 31) & 1 == 0 { 1.0 } else { -1.0 };
            vec[idx] += sign;
        }

        let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vec.iter_mut() {
                *x /= norm;
            }
        }
        vec
    }
}

/// Dot product of two same-dimension vectors.
///
/// Inputs are expected to be unit or zero vectors, which makes this the
/// cosine similarity. Returns `0.0` for empty vectors or mismatched lengths.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Serialize a vector as a JSON array.
pub fn encode_vector(vec: &[f32]) -> serde_json::Result<String> {
    serde_json::to_string(vec)
}

/// Parse a JSON array written by [`encode_vector`].
///
/// `chunk_id` is only used to label the error.
pub fn decode_vector(chunk_id: i64, json: &str) -> Result<Vec<f32>> {
    serde_json::from_str(json).map_err(|source| CoreError::CorruptEmbedding { chunk_id, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_fnv_known_values() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Hello, World! snake_case x2 — Ñandú"),
            vec!["hello", "world", "snake_case", "x2", "ñandú"]
        );
        assert!(tokenize("  ... ---  ").is_empty());
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(matches!(
            HashEmbedder::new(0),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let e = HashEmbedder::new(768).unwrap();
        let text = "JWT authorization middleware validates the bearer token";
        let a = e.embed(text);
        let b = e.embed(text);
        let a_bits: Vec<u32> = a.iter().map(|x| x.to_bits()).collect();
        let b_bits: Vec<u32> = b.iter().map(|x| x.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::new(16).unwrap();
        let v = e.embed("");
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| *x == 0.0));
        assert!(e.embed(" !? ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_normalized() {
        let e = HashEmbedder::new(64).unwrap();
        for text in ["a", "docker compose up", "the the the the", "Ünïcödé tokens 123"] {
            let v = e.embed(text);
            assert!((norm(&v) - 1.0).abs() < 1e-5, "{text}: {}", norm(&v));
        }
    }

    #[test]
    fn test_case_insensitive() {
        let e = HashEmbedder::new(128).unwrap();
        assert_eq!(e.embed("Docker Compose"), e.embed("docker compose"));
    }

    #[test]
    fn test_single_token_bucket_and_sign() {
        let e = HashEmbedder::new(10).unwrap();
        let h = fnv1a_32("a");
        let v = e.embed("A");
        let idx = (h as usize) % 10;
        let expected = if h >> 31 == 0 { 1.0 } else { -1.0 };
        assert_eq!(v[idx], expected);
        assert_eq!(v.iter().filter(|x| **x != 0.0).count(), 1);
    }

    #[test]
    fn test_similarity_self_is_one() {
        let e = HashEmbedder::new(256).unwrap();
        let v = e.embed("retrieval over workspace files");
        assert!((similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_similarity_with_zero() {
        let e = HashEmbedder::new(32).unwrap();
        let v = e.embed("something");
        let zero = e.embed("");
        assert_eq!(similarity(&v, &zero), 0.0);
    }

    #[test]
    fn test_similarity_mismatch_and_empty() {
        assert_eq!(similarity(&[], &[]), 0.0);
        assert_eq!(similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_shared_tokens_score_higher() {
        let e = HashEmbedder::new(768).unwrap();
        let q = e.embed("docker compose healthcheck");
        let near = e.embed("the docker compose file defines a healthcheck");
        let far = e.embed("react component renders a button");
        assert!(similarity(&q, &near) > similarity(&q, &far));
    }

    #[test]
    fn test_vector_json_roundtrip() {
        let v = vec![0.5f32, -0.25, 0.0, 1.0];
        let json = encode_vector(&v).unwrap();
        assert_eq!(json, "[0.5,-0.25,0.0,1.0]");
        assert_eq!(decode_vector(1, &json).unwrap(), v);
    }

    #[test]
    fn test_decode_corrupt() {
        let err = decode_vector(7, "[0.1, oops").unwrap_err();
        assert!(matches!(err, CoreError::CorruptEmbedding { chunk_id: 7, .. }));
    }
}
