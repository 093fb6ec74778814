pub mod onnx_pattern_classifier;
