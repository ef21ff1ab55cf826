//! Tumor classifier network
//!
//! ResNet-18 backbone (torchvision parameter naming) with a replaceable
//! classification head registered under `fc`.

use crate::types::NUM_CLASSES;
use candle_core::{Module, Result, Tensor};
use candle_nn::{linear, Dropout, Func, Linear, VarBuilder};
use candle_transformers::models::resnet;
use serde::Serialize;
use std::fmt;

/// Width of the pooled backbone features
pub const FEATURE_DIM: usize = 512;

/// Width of the hidden layer in the two-layer head
pub const HIDDEN_DIM: usize = 512;

/// Dropout probability between the head layers (identity at inference)
pub const HEAD_DROPOUT: f32 = 0.5;

/// Classification head variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadKind {
    /// `fc.0` linear → ReLU → dropout → `fc.3` linear (training-time head)
    TwoLayer,
    /// Single `fc` linear to the class logits
    SingleLinear,
}

enum Head {
    TwoLayer {
        hidden: Linear,
        dropout: Dropout,
        output: Linear,
    },
    SingleLinear(Linear),
}

/// Backbone plus head
pub struct TumorNet {
    backbone: Func<'static>,
    head: Head,
}

impl TumorNet {
    /// Build the network; every parameter is requested from `vb`
    pub fn new(kind: HeadKind, vb: VarBuilder<'static>) -> Result<Self> {
        let backbone = resnet::resnet18_no_final_layer(vb.clone())?;
        let fc = vb.pp("fc");

        let head = match kind {
            HeadKind::TwoLayer => Head::TwoLayer {
                // Indices follow the torch Sequential positions; ReLU and dropout own no parameters
                hidden: linear(FEATURE_DIM, HIDDEN_DIM, fc.pp("0"))?,
                dropout: Dropout::new(HEAD_DROPOUT),
                output: linear(HIDDEN_DIM, NUM_CLASSES, fc.pp("3"))?,
            },
            HeadKind::SingleLinear => Head::SingleLinear(linear(FEATURE_DIM, NUM_CLASSES, fc)?),
        };

        Ok(Self { backbone, head })
    }

    pub fn head_kind(&self) -> HeadKind {
        match self.head {
            Head::TwoLayer { .. } => HeadKind::TwoLayer,
            Head::SingleLinear(_) => HeadKind::SingleLinear,
        }
    }
}

impl Module for TumorNet {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let features = self.backbone.forward(xs)?;
        match &self.head {
            Head::TwoLayer {
                hidden,
                dropout,
                output,
            } => {
                let h = features.apply(hidden)?.relu()?;
                let h = dropout.forward(&h, false)?;
                h.apply(output)
            }
            Head::SingleLinear(output) => features.apply(output),
        }
    }
}

impl fmt::Debug for TumorNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TumorNet")
            .field("backbone", &"resnet18")
            .field("head", &self.head_kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn parameter_names(kind: HeadKind) -> Vec<String> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        TumorNet::new(kind, vb).unwrap();
        let data = varmap.data().lock().unwrap();
        data.keys().cloned().collect()
    }

    #[test]
    fn test_two_layer_head_parameters() {
        let names = parameter_names(HeadKind::TwoLayer);
        for key in ["fc.0.weight", "fc.0.bias", "fc.3.weight", "fc.3.bias"] {
            assert!(names.iter().any(|n| n == key), "missing {}", key);
        }
        assert!(!names.iter().any(|n| n == "fc.weight"));
        assert!(names.iter().any(|n| n == "layer4.1.bn2.running_var"));
    }

    #[test]
    fn test_single_linear_head_parameters() {
        let names = parameter_names(HeadKind::SingleLinear);
        assert!(names.iter().any(|n| n == "fc.weight"));
        assert!(!names.iter().any(|n| n.starts_with("fc.0")));
        assert!(names.iter().any(|n| n == "conv1.weight"));
    }
}
