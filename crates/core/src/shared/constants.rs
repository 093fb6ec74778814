/// Side length of the square image fed to clustering and classification.
pub const NORMALIZED_SIZE: u32 = 224;

/// Default number of dominant colors extracted per face.
pub const DEFAULT_CLUSTERS: usize = 3;

/// Run the face detector on every Nth captured frame.
pub const DEFAULT_DETECT_EVERY: usize = 5;

pub const CLASSIFIER_MODEL_NAME: &str = "cat_pattern.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
