use anyhow::Result;

/// Width of the fallback embedding space. Matches the sentence encoder so
/// either backend can serve the same engine.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Converts text into fixed-length vectors capturing semantic meaning.
///
/// Implementations must keep dimensionality stable for their lifetime and
/// produce one vector per input, in input order. Empty input text is
/// valid and must still yield a vector.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving order. The default embeds one at a
    /// time; providers with true batched inference may override.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// True when the underlying model failed to initialize and every
    /// vector this provider returns is a meaningless placeholder.
    fn is_degraded(&self) -> bool {
        false
    }
}

impl EmbeddingProvider for Box<dyn EmbeddingProvider> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }

    fn is_degraded(&self) -> bool {
        (**self).is_degraded()
    }
}

/// Deterministic hashed bag-of-tokens embedding. Carries no semantics,
/// but it is stable across runs and platforms, which makes it the
/// no-model-files fallback and the workhorse for tests.
#[derive(Debug, Clone)]
pub struct LexicalEmbeddingProvider {
    dim: usize,
}

impl LexicalEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }
}

impl Default for LexicalEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for LexicalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];

        for token in text
            .to_ascii_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            // FNV-1a, so bucket assignment is identical everywhere.
            let mut h: u64 = 0xcbf2_9ce4_8422_2325;
            for b in token.as_bytes() {
                h ^= u64::from(*b);
                h = h.wrapping_mul(0x100_0000_01b3);
            }
            v[(h as usize) % self.dim] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }

        Ok(v)
    }
}

/// Stand-in installed when the real model fails to load. It honors the
/// provider contract shape-wise (fixed-length zero vectors) but flags
/// itself so the engine refuses to score with it.
#[derive(Debug, Clone)]
pub struct DegradedProvider {
    dim: usize,
}

impl DegradedProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for DegradedProvider {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for DegradedProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.dim])
    }

    fn is_degraded(&self) -> bool {
        true
    }
}
