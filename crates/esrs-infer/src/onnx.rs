//! ONNX Runtime models: MiniLM query embedder and ms-marco cross-encoder.
//!
//! Both are BERT-style encoders exported from sentence-transformers and
//! share loading and tokenization. Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use esrs_core::{Error, Result};
    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::{EncodeInput, Encoding, Tokenizer};
    use tracing::{error, info, warn};

    use crate::cache::InferenceCache;
    use crate::embedder::{EmbedderBackend, EmbeddingResult};
    use crate::reranker::RelevanceScorer;

    /// Maximum sequence length for MiniLM models.
    const MAX_SEQ_LEN: usize = 512;

    /// Default embedding dimension (all-MiniLM-L6-v2).
    const DEFAULT_DIM: usize = 384;

    /// Session and tokenizer loaded from `model.onnx` + `tokenizer.json`.
    struct EncoderModel {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
    }

    /// Raw model output: shape and flattened data.
    struct ModelOutput {
        shape: Vec<i64>,
        data: Vec<f32>,
    }

    impl EncoderModel {
        fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::Inference(format!(
                    "Model not found: {}",
                    model_path.display()
                )));
            }
            if !tokenizer_path.exists() {
                return Err(Error::Inference(format!(
                    "Tokenizer not found: {}",
                    tokenizer_path.display()
                )));
            }

            // With load-dynamic feature, ORT_DYLIB_PATH env var must point to libonnxruntime.so
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("Failed to create session builder: {e}")))?
                .with_intra_threads(2)
                .map_err(|e| Error::Inference(format!("Failed to set threads: {e}")))?
                .commit_from_file(&model_path)
                .map_err(|e| Error::Inference(format!("Failed to load ONNX model: {e}")))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {e}")))?;

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
            })
        }

        fn encode<'s>(&self, input: impl Into<EncodeInput<'s>>) -> Option<Encoding> {
            self.tokenizer
                .encode(input, true)
                .map_err(|e| warn!("Tokenization failed: {}", e))
                .ok()
        }

        /// Run the encoder on one tokenized input and return its first output tensor.
        fn run(&self, encoding: &Encoding) -> Option<(ModelOutput, Vec<u32>)> {
            let seq_len = encoding.get_ids().len().min(MAX_SEQ_LEN);
            let ids: Vec<i64> = encoding.get_ids()[..seq_len]
                .iter()
                .map(|&id| id as i64)
                .collect();
            let mask: Vec<u32> = encoding.get_attention_mask()[..seq_len].to_vec();
            let mask_i64: Vec<i64> = mask.iter().map(|&m| m as i64).collect();
            let type_ids: Vec<i64> = encoding.get_type_ids()[..seq_len]
                .iter()
                .map(|&t| t as i64)
                .collect();

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids))
                .map_err(|e| warn!("Failed to create ids tensor: {}", e))
                .ok()?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_i64))
                .map_err(|e| warn!("Failed to create mask tensor: {}", e))
                .ok()?;
            let type_ids_tensor = Tensor::from_array(([1usize, seq_len], type_ids))
                .map_err(|e| warn!("Failed to create type_ids tensor: {}", e))
                .ok()?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| warn!("ONNX inference failed: {}", e))
                .ok()?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| warn!("Failed to extract output tensor: {}", e))
                .ok()?;

            Some((
                ModelOutput {
                    shape: shape.iter().copied().collect(),
                    data: data.to_vec(),
                },
                mask,
            ))
        }
    }

    /// ONNX embedding engine using all-MiniLM-L6-v2.
    pub struct OnnxEmbedder {
        model: EncoderModel,
        cache: InferenceCache<Array1<f32>>,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load from a directory holding `model.onnx` and `tokenizer.json`.
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model = EncoderModel::load(model_dir)?;
            info!("ONNX embedder loaded: dim={}, dir={}", DEFAULT_DIM, model_dir.display());
            Ok(Self {
                model,
                cache: InferenceCache::default_cache(),
                dimension: DEFAULT_DIM,
            })
        }

        fn infer(&self, text: &str) -> Option<Array1<f32>> {
            let encoding = self.model.encode(text)?;
            let (output, mask) = self.model.run(&encoding)?;

            // [1, seq_len, dim] token embeddings need mean pooling; [1, dim] is already pooled
            let pooled = match output.shape.as_slice() {
                [_, _, dim] => {
                    let dim = *dim as usize;
                    let mask_sum: f32 = mask.iter().map(|&m| m as f32).sum();
                    if mask_sum < 1e-9 {
                        return None;
                    }
                    let mut pooled = Array1::zeros(dim);
                    for (i, &m) in mask.iter().enumerate() {
                        if m > 0 {
                            let offset = i * dim;
                            for d in 0..dim {
                                pooled[d] += output.data[offset + d];
                            }
                        }
                    }
                    pooled / mask_sum
                }
                [_, dim] => Array1::from_vec(output.data[..*dim as usize].to_vec()),
                other => {
                    warn!("Unexpected output shape: {:?}", other);
                    return None;
                }
            };

            let norm = pooled.dot(&pooled).sqrt();
            if norm < 1e-9 {
                return Some(pooled);
            }
            Some(pooled / norm)
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Option<EmbeddingResult> {
            if let Some(cached) = self.cache.get(text) {
                return Some(EmbeddingResult {
                    embedding: cached,
                    cached: true,
                });
            }

            let embedding = self.infer(text)?;
            self.cache.put(text.to_string(), embedding.clone());

            Some(EmbeddingResult {
                embedding,
                cached: false,
            })
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// Cross-encoder relevance model (cross-encoder/ms-marco-MiniLM-L6-v2).
    pub struct OnnxCrossEncoder {
        model: EncoderModel,
        cache: InferenceCache<f32>,
    }

    impl OnnxCrossEncoder {
        /// Load from a directory holding `model.onnx` and `tokenizer.json`.
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model = EncoderModel::load(model_dir)?;
            info!("ONNX cross-encoder loaded: dir={}", model_dir.display());
            Ok(Self {
                model,
                cache: InferenceCache::default_cache(),
            })
        }
    }

    impl RelevanceScorer for OnnxCrossEncoder {
        fn score(&self, query: &str, passage: &str) -> Result<f32> {
            let key = InferenceCache::<f32>::pair_key(query, passage);
            if let Some(score) = self.cache.get(&key) {
                return Ok(score);
            }

            // Output is a single logit of shape [1, 1]
            let score = self
                .model
                .encode((query, passage))
                .and_then(|encoding| self.model.run(&encoding))
                .and_then(|(output, _)| output.data.first().copied())
                .filter(|score| score.is_finite())
                .ok_or_else(|| {
                    error!("Cross-encoder {} failed to score a passage", self.name());
                    Error::Inference(format!("{} could not score passage", self.name()))
                })?;

            self.cache.put(key, score);
            Ok(score)
        }

        fn name(&self) -> &str {
            "ms-marco-MiniLM-L6-v2"
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::{OnnxCrossEncoder, OnnxEmbedder};
