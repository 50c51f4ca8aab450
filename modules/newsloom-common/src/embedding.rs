//! Embedding vector codec.
//!
//! The relational store keeps embeddings as an opaque byte blob. This module
//! is the single codec between that blob and the in-memory `Vec<f32>`: the
//! blob is the UTF-8 JSON array of the vector's components. `decode(encode(v))
//! == v` holds for every vector of finite components; non-finite components
//! are rejected at encode time.

use anyhow::{bail, Context, Result};

/// Dimension of the embedding vectors produced by the vectorization call.
pub const EMBEDDING_DIM: usize = 1536;

/// Encode an embedding vector into its stored byte form.
pub fn encode(vector: &[f32]) -> Result<Vec<u8>> {
    if let Some(component) = vector.iter().find(|c| !c.is_finite()) {
        bail!("embedding contains non-finite component {component}");
    }
    serde_json::to_vec(vector).context("encoding embedding vector")
}

/// Decode a stored byte blob back into an embedding vector.
pub fn decode(blob: &[u8]) -> Result<Vec<f32>> {
    serde_json::from_slice(blob).context("decoding embedding blob")
}
