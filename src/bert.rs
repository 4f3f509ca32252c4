//! BERT sequence classifier backend (requires the `bert` feature).
//!
//! Loads a fine-tuned `BertForSequenceClassification` exported in the
//! Hugging Face layout:
//!
//! ```text
//! saved_bert/
//! ├── config.json          model hyperparameters, num_labels = 5
//! ├── tokenizer.json       fast tokenizer (WordPiece vocabulary)
//! └── model.safetensors    weights (or pytorch_model.bin)
//! ```
//!
//! Weight names follow the Transformers layout: `bert.*` for the encoder and
//! pooler, `classifier.*` for the five-way head.
//!
//! ## Devices
//!
//! Built with the `cuda` or `metal` feature, loading tries CUDA, then Metal,
//! then falls back to CPU. Without either feature inference runs on CPU.
//! `force_cpu` skips the probe.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::codec::TokenCodec;
use crate::config::ClassifierConfig;
use crate::label::NUM_LABELS;
use crate::probability::Probabilities;
use crate::scorer::{ModelHandle, ModelLoader, SequenceScorer};
use crate::{Error, Result, TokenWindow};

/// Tokenizer adapter over a Hugging Face `tokenizers` vocabulary.
///
/// Padding and truncation are switched off so encoding reports the true
/// length of the document.
#[derive(Debug, Clone)]
pub struct HfTokenizerCodec {
    tokenizer: Tokenizer,
}

impl HfTokenizerCodec {
    /// Wrap a tokenizer, disabling its padding and truncation.
    ///
    /// # Errors
    ///
    /// [`Error::Tokenization`] if truncation cannot be reset.
    pub fn new(mut tokenizer: Tokenizer) -> Result<Self> {
        tokenizer
            .with_padding(None)
            .with_truncation(None)
            .map_err(|e| Error::Tokenization(e.to_string()))?;
        Ok(Self { tokenizer })
    }
}

impl TokenCodec for HfTokenizerCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| Error::Tokenization(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| Error::Tokenization(e.to_string()))
    }
}

/// Fine-tuned BERT with a five-way classification head.
pub struct BertSequenceScorer {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl BertSequenceScorer {
    /// Assemble encoder, pooler, and head from `vb`.
    ///
    /// `tokenizer` must already pad and truncate to the scoring width.
    fn build(
        config: &Config,
        vb: &VarBuilder<'_>,
        tokenizer: Tokenizer,
        device: Device,
    ) -> candle_core::Result<Self> {
        let bert = BertModel::load(vb.pp("bert"), config)?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert.pooler.dense"),
        )?;
        let classifier = candle_nn::linear(config.hidden_size, NUM_LABELS, vb.pp("classifier"))?;
        Ok(Self {
            bert,
            pooler,
            classifier,
            tokenizer,
            device,
        })
    }

    fn to_inference(e: candle_core::Error) -> Error {
        Error::Inference(e.to_string())
    }

    /// The device inference runs on.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl SequenceScorer for BertSequenceScorer {
    fn score(&self, text: &str) -> Result<Probabilities> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Tokenization(e.to_string()))?;

        let ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(Self::to_inference)?;
        let mask = Tensor::new(encoding.get_attention_mask(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(Self::to_inference)?;
        let type_ids = ids.zeros_like().map_err(Self::to_inference)?;

        // Weights are plain tensors, not `Var`s, so nothing records gradients.
        let probabilities = (|| -> candle_core::Result<Vec<f32>> {
            let hidden = self.bert.forward(&ids, &type_ids, Some(&mask))?;
            let cls = hidden.i((.., 0))?;
            let pooled = self.pooler.forward(&cls)?.tanh()?;
            let logits = self.classifier.forward(&pooled)?;
            candle_nn::ops::softmax(&logits, D::Minus1)?
                .squeeze(0)?
                .to_vec1::<f32>()
        })()
        .map_err(Self::to_inference)?;

        Probabilities::try_from_slice(&probabilities)
    }
}

impl std::fmt::Debug for BertSequenceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertSequenceScorer")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct LabelHeader {
    num_labels: Option<usize>,
    id2label: Option<HashMap<String, String>>,
}

impl LabelHeader {
    fn label_count(&self) -> Option<usize> {
        self.id2label
            .as_ref()
            .map(HashMap::len)
            .or(self.num_labels)
    }
}

/// A trained classifier directory on disk.
///
/// Nothing is read until [`ModelLoader::load`] is called.
#[derive(Debug, Clone)]
pub struct BertArtifact {
    dir: PathBuf,
    window: usize,
    force_cpu: bool,
}

impl BertArtifact {
    /// Point at an artifact directory, scoring with `window`-token inputs.
    pub fn new(dir: impl Into<PathBuf>, window: TokenWindow, force_cpu: bool) -> Self {
        Self {
            dir: dir.into(),
            window: window.window(),
            force_cpu,
        }
    }

    /// The artifact named by a configuration.
    ///
    /// # Errors
    ///
    /// If the configured window is invalid.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self::new(
            &config.model_dir,
            config.token_window()?,
            config.force_cpu,
        ))
    }

    /// The artifact directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unavailable(&self, reason: impl Into<String>) -> Error {
        Error::model_unavailable(&self.dir, reason)
    }

    fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(self.unavailable(format!("{name} not found")))
        }
    }


    #[allow(unsafe_code)]
    fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let safetensors = self.dir.join("model.safetensors");
        let pth = self.dir.join("pytorch_model.bin");
        let vb = if safetensors.is_file() {
            // SAFETY: the weights file is memory-mapped read-only and must not
            // be modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device) }
        } else if pth.is_file() {
            VarBuilder::from_pth(&pth, DType::F32, device)
        } else {
            return Err(self.unavailable("no model.safetensors or pytorch_model.bin"));
        };
        vb.map_err(|e| self.unavailable(format!("weights: {e}")))
    }

    fn scoring_tokenizer(&self, base: &Tokenizer) -> Result<Tokenizer> {
        let mut tokenizer = base.clone();
        let (pad_id, pad_token) = match base.get_padding() {
            Some(p) => (p.pad_id, p.pad_token.clone()),
            None => {
                let token = "[PAD]".to_string();
                (base.token_to_id(&token).unwrap_or(0), token)
            }
        };
        tokenizer
            .with_padding(Some(PaddingParams {
                strategy: PaddingStrategy::Fixed(self.window),
                pad_id,
                pad_token,
                ..Default::default()
            }))
            .with_truncation(Some(TruncationParams {
                max_length: self.window,
                ..Default::default()
            }))
            .map_err(|e| self.unavailable(format!("tokenizer: {e}")))?;
        Ok(tokenizer)
    }
}

/// First available accelerator: CUDA, then Metal, then CPU.
///
/// Accelerators are only probed when built in via the `cuda` or `metal`
/// feature.
fn select_device(force_cpu: bool) -> Device {
    if force_cpu {
        return Device::Cpu;
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("CUDA device unavailable: {e}"),
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("Metal device unavailable: {e}"),
        }
    }

    Device::Cpu
}

impl ModelLoader for BertArtifact {
    fn load(&self) -> Result<ModelHandle> {
        if !self.dir.is_dir() {
            return Err(self.unavailable("directory not found"));
        }

        let config_path = self.require("config.json")?;
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| self.unavailable(format!("config.json: {e}")))?;
        let header: LabelHeader = serde_json::from_str(&config_text)
            .map_err(|e| self.unavailable(format!("config.json: {e}")))?;
        if let Some(n) = header.label_count() {
            if n != NUM_LABELS {
                return Err(self.unavailable(format!(
                    "classifier has {n} labels, expected {NUM_LABELS}"
                )));
            }
        }
        let config: Config = serde_json::from_str(&config_text)
            .map_err(|e| self.unavailable(format!("config.json: {e}")))?;

        let tokenizer_path = self.require("tokenizer.json")?;
        let base = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| self.unavailable(format!("tokenizer.json: {e}")))?;

        let device = select_device(self.force_cpu);
        let vb = self.var_builder(&device)?;

        let scoring = self.scoring_tokenizer(&base)?;
        let scorer = BertSequenceScorer::build(&config, &vb, scoring, device.clone())
            .map_err(|e| self.unavailable(format!("weights: {e}")))?;
        let codec = HfTokenizerCodec::new(base)?;

        log::info!(
            "loaded classifier from {} on {:?}",
            self.dir.display(),
            device
        );
        Ok(ModelHandle::new(codec, scorer))
    }
}
