use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of job a workflow produces. Determines which fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowCategory {
    TextToImage,
    ImageToImage,
    TextToVideo,
    ImageToVideo,
}

impl WorkflowCategory {
    pub fn required_fields(self) -> &'static [FieldKey] {
        use FieldKey::*;
        match self {
            WorkflowCategory::TextToImage | WorkflowCategory::TextToVideo => &[PositivePrompt],
            WorkflowCategory::ImageToImage | WorkflowCategory::ImageToVideo => {
                &[PositivePrompt, Image]
            }
        }
    }

    pub fn optional_fields(self) -> &'static [FieldKey] {
        use FieldKey::*;
        match self {
            WorkflowCategory::TextToImage => &[
                NegativePrompt, Width, Height, Seed, Steps, Cfg, SamplerName, Scheduler,
                Checkpoint, Unet, Clip, Vae, BatchSize,
            ],
            WorkflowCategory::ImageToImage => &[
                NegativePrompt, Seed, Steps, Cfg, SamplerName, Scheduler, Denoise, Checkpoint,
                Unet, Clip, Vae,
            ],
            WorkflowCategory::TextToVideo => &[
                NegativePrompt, Width, Height, Length, FrameRate, Seed, Steps, Cfg, SamplerName,
                Scheduler, Checkpoint, Unet, Clip, Vae,
            ],
            WorkflowCategory::ImageToVideo => &[
                NegativePrompt, Width, Height, Length, FrameRate, Seed, Steps, Cfg, SamplerName,
                Scheduler, Unet, Clip, Vae,
            ],
        }
    }
}

impl FromStr for WorkflowCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "t2i" | "text_to_image" => Ok(WorkflowCategory::TextToImage),
            "i2i" | "image_to_image" => Ok(WorkflowCategory::ImageToImage),
            "t2v" | "text_to_video" => Ok(WorkflowCategory::TextToVideo),
            "i2v" | "image_to_video" => Ok(WorkflowCategory::ImageToVideo),
            other => Err(format!("unknown workflow category '{other}'")),
        }
    }
}

/// A semantic field a caller can fill in before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    PositivePrompt,
    NegativePrompt,
    Width,
    Height,
    Seed,
    Steps,
    Cfg,
    SamplerName,
    Scheduler,
    Denoise,
    Checkpoint,
    Unet,
    Clip,
    Vae,
    Image,
    Length,
    FrameRate,
    BatchSize,
}

impl FieldKey {
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::PositivePrompt,
        FieldKey::NegativePrompt,
        FieldKey::Width,
        FieldKey::Height,
        FieldKey::Seed,
        FieldKey::Steps,
        FieldKey::Cfg,
        FieldKey::SamplerName,
        FieldKey::Scheduler,
        FieldKey::Denoise,
        FieldKey::Checkpoint,
        FieldKey::Unet,
        FieldKey::Clip,
        FieldKey::Vae,
        FieldKey::Image,
        FieldKey::Length,
        FieldKey::FrameRate,
        FieldKey::BatchSize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::PositivePrompt => "positive_prompt",
            FieldKey::NegativePrompt => "negative_prompt",
            FieldKey::Width => "width",
            FieldKey::Height => "height",
            FieldKey::Seed => "seed",
            FieldKey::Steps => "steps",
            FieldKey::Cfg => "cfg",
            FieldKey::SamplerName => "sampler_name",
            FieldKey::Scheduler => "scheduler",
            FieldKey::Denoise => "denoise",
            FieldKey::Checkpoint => "checkpoint",
            FieldKey::Unet => "unet",
            FieldKey::Clip => "clip",
            FieldKey::Vae => "vae",
            FieldKey::Image => "image",
            FieldKey::Length => "length",
            FieldKey::FrameRate => "frame_rate",
            FieldKey::BatchSize => "batch_size",
        }
    }

    /// Input names that realize this field on common node classes.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            FieldKey::PositivePrompt | FieldKey::NegativePrompt => PROMPT_ALIASES,
            FieldKey::Width => &["width"],
            FieldKey::Height => &["height"],
            FieldKey::Seed => &["seed", "noise_seed"],
            FieldKey::Steps => &["steps"],
            FieldKey::Cfg => &["cfg"],
            FieldKey::SamplerName => &["sampler_name"],
            FieldKey::Scheduler => &["scheduler"],
            FieldKey::Denoise => &["denoise"],
            FieldKey::Checkpoint => &["ckpt_name"],
            FieldKey::Unet => &["unet_name"],
            FieldKey::Clip => &["clip_name", "clip_name1"],
            FieldKey::Vae => &["vae_name"],
            FieldKey::Image => &["image"],
            FieldKey::Length => &["length", "frame_count", "num_frames"],
            FieldKey::FrameRate => &["fps", "frame_rate"],
            FieldKey::BatchSize => &["batch_size"],
        }
    }

    pub fn is_prompt(self) -> bool {
        matches!(self, FieldKey::PositivePrompt | FieldKey::NegativePrompt)
    }

    /// The `{{key}}` token substituted at submission time.
    pub fn placeholder(self) -> String {
        format!("{{{{{}}}}}", self.as_str())
    }
}

/// Input names carrying prompt text on stock encoders.
pub const PROMPT_ALIASES: &[&str] = &["text", "prompt"];

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}
