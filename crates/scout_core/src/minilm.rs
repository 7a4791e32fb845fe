//! all-MiniLM-L6-v2 sentence encoder on candle. CPU inference, one
//! sequence at a time; mean pooling over the final hidden states and an
//! L2-normalized 384-dimensional output.

use std::path::Path;

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{
    embedding, layer_norm, linear, Embedding, LayerNorm, Linear, Module, VarBuilder,
};

use crate::embed::EmbeddingProvider;

// all-MiniLM-L6-v2 dimensions. The checkpoint is the contract; these
// never vary at runtime.
const HIDDEN: usize = 384;
const INTERMEDIATE: usize = 1536;
const HEADS: usize = 12;
const HEAD_DIM: usize = HIDDEN / HEADS;
const LAYERS: usize = 6;
const VOCAB: usize = 30522;
const MAX_POSITIONS: usize = 512;
const TYPE_VOCAB: usize = 2;
const NORM_EPS: f64 = 1e-12;

struct TokenEmbeddings {
    words: Embedding,
    positions: Embedding,
    token_types: Embedding,
    norm: LayerNorm,
}

impl TokenEmbeddings {
    fn load(vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            words: embedding(VOCAB, HIDDEN, vb.pp("word_embeddings"))?,
            positions: embedding(MAX_POSITIONS, HIDDEN, vb.pp("position_embeddings"))?,
            token_types: embedding(TYPE_VOCAB, HIDDEN, vb.pp("token_type_embeddings"))?,
            norm: layer_norm(HIDDEN, NORM_EPS, vb.pp("LayerNorm"))?,
        })
    }

    fn forward(&self, ids: &Tensor) -> Result<Tensor> {
        let device = ids.device();
        let seq_len = ids.dim(0)?;
        let positions = Tensor::arange(0u32, seq_len as u32, device)?;
        // Single-segment input: token type 0 everywhere.
        let types = Tensor::zeros(seq_len, DType::U32, device)?;

        let summed = ((self.words.forward(ids)? + self.positions.forward(&positions)?)?
            + self.token_types.forward(&types)?)?;
        Ok(self.norm.forward(&summed)?)
    }
}

struct Attention {
    query: Linear,
    key: Linear,
    value: Linear,
    dense: Linear,
    norm: LayerNorm,
}

impl Attention {
    fn load(vb: VarBuilder) -> Result<Self> {
        let self_vb = vb.pp("attention").pp("self");
        let out_vb = vb.pp("attention").pp("output");
        Ok(Self {
            query: linear(HIDDEN, HIDDEN, self_vb.pp("query"))?,
            key: linear(HIDDEN, HIDDEN, self_vb.pp("key"))?,
            value: linear(HIDDEN, HIDDEN, self_vb.pp("value"))?,
            dense: linear(HIDDEN, HIDDEN, out_vb.pp("dense"))?,
            norm: layer_norm(HIDDEN, NORM_EPS, out_vb.pp("LayerNorm"))?,
        })
    }

    // (seq, hidden) -> (heads, seq, head_dim)
    fn split_heads(x: &Tensor) -> Result<Tensor> {
        let seq_len = x.dim(0)?;
        Ok(x.reshape((seq_len, HEADS, HEAD_DIM))?
            .transpose(0, 1)?
            .contiguous()?)
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let seq_len = x.dim(0)?;
        let q = Self::split_heads(&self.query.forward(x)?)?;
        let k = Self::split_heads(&self.key.forward(x)?)?;
        let v = Self::split_heads(&self.value.forward(x)?)?;

        let scale = 1.0 / (HEAD_DIM as f64).sqrt();
        let weights = q.matmul(&k.t()?)?.affine(scale, 0.0)?;
        let weights = candle_nn::ops::softmax_last_dim(&weights)?;
        let context = weights
            .matmul(&v)?
            .transpose(0, 1)?
            .contiguous()?
            .reshape((seq_len, HIDDEN))?;

        // Residual + post-norm, BERT style.
        let out = self.dense.forward(&context)?;
        Ok(self.norm.forward(&(x + out)?)?)
    }
}

struct FeedForward {
    up: Linear,
    down: Linear,
    norm: LayerNorm,
}

impl FeedForward {
    fn load(vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            up: linear(HIDDEN, INTERMEDIATE, vb.pp("intermediate").pp("dense"))?,
            down: linear(INTERMEDIATE, HIDDEN, vb.pp("output").pp("dense"))?,
            norm: layer_norm(HIDDEN, NORM_EPS, vb.pp("output").pp("LayerNorm"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let h = self.up.forward(x)?.gelu_erf()?;
        let h = self.down.forward(&h)?;
        Ok(self.norm.forward(&(x + h)?)?)
    }
}

struct EncoderLayer {
    attention: Attention,
    ffn: FeedForward,
}

impl EncoderLayer {
    fn load(vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            attention: Attention::load(vb.clone())?,
            ffn: FeedForward::load(vb)?,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        self.ffn.forward(&self.attention.forward(x)?)
    }
}

struct SentenceEncoder {
    embeddings: TokenEmbeddings,
    layers: Vec<EncoderLayer>,
}

impl SentenceEncoder {
    fn load(weights: &Path, device: &Device) -> Result<Self> {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };

        let embeddings = TokenEmbeddings::load(vb.pp("embeddings"))?;
        let mut layers = Vec::with_capacity(LAYERS);
        for i in 0..LAYERS {
            layers.push(EncoderLayer::load(
                vb.pp("encoder").pp("layer").pp(i.to_string()),
            )?);
        }

        Ok(Self { embeddings, layers })
    }

    /// Mean-pooled, L2-normalized sentence vector for one token sequence.
    fn encode(&self, token_ids: &[u32], device: &Device) -> Result<Vec<f32>> {
        if token_ids.is_empty() {
            return Ok(vec![0.0; HIDDEN]);
        }
        // Oversized inputs are truncated; the embedder accepts any text.
        let token_ids = &token_ids[..token_ids.len().min(MAX_POSITIONS)];
        let ids = Tensor::new(token_ids, device)?;

        let mut hidden = self.embeddings.forward(&ids)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden)?;
        }

        let pooled = hidden.mean(0)?;
        let norm: f32 = pooled.sqr()?.sum_all()?.sqrt()?.to_scalar()?;
        let pooled = if norm > 0.0 {
            pooled.affine(1.0 / f64::from(norm), 0.0)?
        } else {
            pooled
        };
        Ok(pooled.to_vec1::<f32>()?)
    }
}

/// Sentence-embedding backend over a local all-MiniLM-L6-v2 checkpoint
/// (`.safetensors` weights plus a `tokenizer.json`).
pub struct MiniLmEmbeddingProvider {
    encoder: SentenceEncoder,
    tokenizer: tokenizers::Tokenizer,
    device: Device,
}

impl MiniLmEmbeddingProvider {
    pub fn load(weights_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        let device = Device::Cpu;
        let encoder = SentenceEncoder::load(weights_path, &device)?;
        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("load tokenizer: {e}"))?;
        tracing::info!(weights = %weights_path.display(), "sentence encoder ready");

        Ok(Self {
            encoder,
            tokenizer,
            device,
        })
    }

    /// Output width; fixed for the lifetime of the loaded model.
    pub fn dimension(&self) -> usize {
        HIDDEN
    }
}

impl EmbeddingProvider for MiniLmEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenize: {e}"))?;
        self.encoder.encode(encoding.get_ids(), &self.device)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Sequential inference; the contract is order, not throughput.
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::cosine_similarity;
    use std::path::PathBuf;

    fn model_files() -> Option<(PathBuf, PathBuf)> {
        let base = Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()?
            .parent()?
            .join("models");
        let weights = base.join("all-MiniLM-L6-v2.safetensors");
        let tokenizer = base.join("all-MiniLM-L6-v2-tokenizer.json");
        (weights.exists() && tokenizer.exists()).then_some((weights, tokenizer))
    }

    #[test]
    fn encodes_normalized_vectors() {
        let Some((weights, tokenizer)) = model_files() else {
            eprintln!("Skipping: all-MiniLM-L6-v2 weights or tokenizer not found");
            return;
        };

        let provider = MiniLmEmbeddingProvider::load(&weights, &tokenizer).expect("load");
        let v = provider
            .embed("A hackathon about generative AI.")
            .expect("embed");

        assert_eq!(v.len(), provider.dimension());
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "L2 norm should be ~1.0, got {norm}");
    }

    #[test]
    fn related_texts_score_higher_than_unrelated() {
        let Some((weights, tokenizer)) = model_files() else {
            eprintln!("Skipping: all-MiniLM-L6-v2 weights or tokenizer not found");
            return;
        };

        let provider = MiniLmEmbeddingProvider::load(&weights, &tokenizer).expect("load");
        let hackathon = provider
            .embed("Topic: AI, Sustainability. Description: Build generative AI models.")
            .expect("embed");
        let similar = provider
            .embed("A student competition on machine learning for climate.")
            .expect("embed");
        let unrelated = provider
            .embed("A basic workshop on HTML and CSS for beginners.")
            .expect("embed");

        let close = cosine_similarity(&hackathon, &similar);
        let far = cosine_similarity(&hackathon, &unrelated);
        assert!(
            close > far,
            "related texts should score higher: {close} vs {far}"
        );
    }

    #[test]
    fn empty_text_still_produces_a_vector() {
        let Some((weights, tokenizer)) = model_files() else {
            eprintln!("Skipping: all-MiniLM-L6-v2 weights or tokenizer not found");
            return;
        };

        let provider = MiniLmEmbeddingProvider::load(&weights, &tokenizer).expect("load");
        let v = provider.embed("").expect("embed");
        assert_eq!(v.len(), provider.dimension());
    }
}
