//! Classification engine
//!
//! Forward pass, softmax over the four logits, top class with first-index
//! tie-break. An absent model yields the placeholder result instead of an
//! error; only genuine runtime faults are reported.

use crate::errors::{NeuroError, Result};
use crate::models::handle::ModelSlot;
use crate::types::{ClassificationResult, NUM_CLASSES};
use candle_core::{DType, Tensor, D};
use tracing::debug;

fn inference_fault(err: candle_core::Error) -> NeuroError {
    NeuroError::Inference(err.to_string())
}

/// Classify one preprocessed batch against the given slot
pub fn classify(slot: &ModelSlot, input: &Tensor) -> Result<ClassificationResult> {
    let handle = match slot {
        ModelSlot::Loaded(handle) => handle,
        ModelSlot::Absent { reason } => {
            debug!(reason = %reason, "No model loaded; returning placeholder classification");
            return Ok(ClassificationResult::placeholder());
        }
    };

    // Parameters are detached at load time, so no backprop graph is recorded
    let logits = handle.forward(input).map_err(inference_fault)?;
    let distribution = softmax_distribution(&logits)?;

    ClassificationResult::from_distribution(&distribution, handle.result_source())
}

/// Softmax over a `(1, 4)` or `(4,)` logit tensor
pub fn softmax_distribution(logits: &Tensor) -> Result<Vec<f32>> {
    let logits = match logits.dims() {
        [1, n] if *n == NUM_CLASSES => logits.squeeze(0).map_err(inference_fault)?,
        [n] if *n == NUM_CLASSES => logits.clone(),
        other => {
            return Err(NeuroError::Inference(format!(
                "Unexpected output shape {:?}; expected [1, {}]",
                other, NUM_CLASSES
            )));
        }
    };
    let logits = logits.to_dtype(DType::F32).map_err(inference_fault)?;

    let raw = logits.to_vec1::<f32>().map_err(inference_fault)?;
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(NeuroError::Inference(format!(
            "Non-finite logits: {:?}",
            raw
        )));
    }

    let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)
        .and_then(|p| p.to_vec1::<f32>())
        .map_err(inference_fault)?;

    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::handle::ModelHandle;
    use crate::models::state::LoaderState;
    use crate::types::{Category, ResultSource};
    use candle_core::Device;

    fn logits(values: &[f32]) -> Tensor {
        Tensor::from_slice(values, (1, values.len()), &Device::Cpu).unwrap()
    }

    fn constant_model(values: [f32; 4], state: LoaderState) -> ModelSlot {
        let network = candle_nn::func(move |xs: &Tensor| {
            let batch = xs.dim(0)?;
            Tensor::from_slice(&values, (1, 4), xs.device())?.repeat((batch, 1))
        });
        ModelSlot::Loaded(ModelHandle::new(network, state, None))
    }

    #[test]
    fn test_uniform_logits_pick_first() {
        let probs = softmax_distribution(&logits(&[0.0, 0.0, 0.0, 0.0])).unwrap();
        assert!(probs.iter().all(|p| (p - 0.25).abs() < 1e-6));

        let slot = constant_model([0.0; 4], LoaderState::Ready);
        let input = Tensor::zeros((1, 3, 2, 2), DType::F32, &Device::Cpu).unwrap();
        let result = classify(&slot, &input).unwrap();
        assert_eq!(result.predicted, Category::NoTumor);
        assert_eq!(result.source, ResultSource::Model);
    }

    #[test]
    fn test_extreme_logits_stay_finite() {
        let probs = softmax_distribution(&logits(&[1000.0, -1000.0, 0.0, 999.0])).unwrap();
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_flat_logits_accepted() {
        let flat = Tensor::new(&[1f32, 2.0, 3.0, 4.0], &Device::Cpu).unwrap();
        let probs = softmax_distribution(&flat).unwrap();
        assert_eq!(probs.len(), 4);
        assert!(probs[3] > probs[2]);
    }

    #[test]
    fn test_wrong_shape_is_inference_error() {
        let err = softmax_distribution(&logits(&[0.1, 0.2, 0.3])).unwrap_err();
        assert!(matches!(err, NeuroError::Inference(_)));
    }

    #[test]
    fn test_nan_is_inference_error() {
        let err = softmax_distribution(&logits(&[f32::NAN, 0.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, NeuroError::Inference(_)));
    }

    #[test]
    fn test_degraded_handle_is_tagged() {
        let slot = constant_model([0.0, 0.0, 5.0, 0.0], LoaderState::Degraded);
        let input = Tensor::zeros((1, 3, 2, 2), DType::F32, &Device::Cpu).unwrap();
        let result = classify(&slot, &input).unwrap();
        assert_eq!(result.predicted, Category::Meningioma);
        assert_eq!(result.source, ResultSource::DegradedModel);
    }

    #[test]
    fn test_absent_model_returns_placeholder() {
        let slot = ModelSlot::absent("no weights");
        let input = Tensor::zeros((1, 3, 224, 224), DType::F32, &Device::Cpu).unwrap();
        let result = classify(&slot, &input).unwrap();
        assert!(result.is_placeholder());
        assert_eq!(result.predicted, Category::NoTumor);
    }
}
