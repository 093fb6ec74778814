use std::path::Path;

use crate::classification::domain::pattern_classifier::{
    prediction_from_scores, PatternClassifier, Prediction,
};
use crate::classification::domain::tensor_adapter::{to_tensor, RowOrder};
use crate::detection::domain::face_normalizer::NormalizedImage;

/// Coat pattern classifier backed by an ONNX model.
///
/// Input: `(1, 224, 224, 3)` float tensor in `[-1, 1]`.
/// Output 0: one softmax score per [`CatPattern`](crate::classification::domain::pattern_classifier::CatPattern).
pub struct OnnxPatternClassifier {
    session: ort::session::Session,
    row_order: RowOrder,
}

impl OnnxPatternClassifier {
    pub fn new(model_path: &Path, row_order: RowOrder) -> Result<Self, Box<dyn std::error::Error>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .with_execution_providers(execution_providers())?
            .commit_from_file(model_path)?;
        log::info!("loaded pattern classifier from {}", model_path.display());
        Ok(Self { session, row_order })
    }
}

impl PatternClassifier for OnnxPatternClassifier {
    fn classify(
        &mut self,
        image: &NormalizedImage,
    ) -> Result<Prediction, Box<dyn std::error::Error>> {
        let tensor = to_tensor(image, self.row_order);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let scores = outputs[0].try_extract_array::<f32>()?;
        let scores = scores.as_slice().ok_or("Cannot get score slice")?;
        Ok(prediction_from_scores(scores)?)
    }
}

/// Platform-specific provider; ONNX Runtime falls back to CPU when it is unavailable.
fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
