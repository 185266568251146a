use crate::graph::Node;
use serde_json::Value;
use std::fmt::Debug;

/// Which half of a dual-path (two-expert) sampler pipeline a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoisePath {
    High,
    Low,
}

/// Classifies the sampler consuming a model-sampling node as high- or low-noise.
///
/// Implement this to support sampler conventions other than the stock one.
pub trait NoisePathConvention: Send + Sync + Debug {
    /// `None` when the node is not a sampler this convention understands.
    fn classify(&self, sampler: &Node) -> Option<NoisePath>;
}

/// Advanced samplers whose start step is exactly 0 run the high-noise path; any other
/// numeric start step runs the low-noise path.
#[derive(Debug, Clone)]
pub struct StartStepConvention {
    pub sampler_type: String,
    pub start_step_input: String,
}

impl Default for StartStepConvention {
    fn default() -> Self {
        Self {
            sampler_type: "KSamplerAdvanced".to_string(),
            start_step_input: "start_at_step".to_string(),
        }
    }
}

impl NoisePathConvention for StartStepConvention {
    fn classify(&self, sampler: &Node) -> Option<NoisePath> {
        if sampler.class_type != self.sampler_type {
            return None;
        }
        let start = sampler.literal(&self.start_step_input).and_then(Value::as_f64)?;
        Some(if start == 0.0 {
            NoisePath::High
        } else {
            NoisePath::Low
        })
    }
}
