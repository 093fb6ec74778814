use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use catpattern_core::classification::domain::pattern_classifier::PatternClassifier;
use catpattern_core::classification::infrastructure::onnx_pattern_classifier::OnnxPatternClassifier;
use catpattern_core::detection::domain::face_detector::FaceDetector;
use catpattern_core::detection::domain::face_region_extractor::CropPolicy;
use catpattern_core::detection::infrastructure::skip_frame_detector::SkipFrameDetector;
use catpattern_core::detection::infrastructure::static_face_detector::{
    parse_box, StaticFaceDetector,
};
use catpattern_core::pipeline::analyze_cat_use_case::{AnalysisResult, AnalyzeCatUseCase};
use catpattern_core::pipeline::pipeline_logger::LogPipelineLogger;
use catpattern_core::shared::bounding_box::BoundingBox;
use catpattern_core::shared::color::ColorSpace;
use catpattern_core::shared::config::AnalysisConfig;
use catpattern_core::shared::constants::CLASSIFIER_MODEL_NAME;
use catpattern_core::shared::model_resolver::{self, ModelResolveError};
use catpattern_core::video::infrastructure::image_file_reader::ImageFileReader;
use catpattern_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Cat face color clustering and coat pattern classification.
#[derive(Parser, Debug)]
#[command(name = "catpattern")]
struct Cli {
    /// Input image, or a directory of images analyzed as a capture sequence.
    input: PathBuf,

    /// Detected cat face as x,y,w,h (repeatable).
    #[arg(long = "box", value_parser = parse_box, allow_hyphen_values = true)]
    boxes: Vec<BoundingBox>,

    /// ONNX pattern classifier. Defaults to the cached or bundled model;
    /// colors are still reported when none is found.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Number of dominant colors.
    #[arg(long)]
    clusters: Option<usize>,

    /// Clustering color space: hsv, rgb or bgr.
    #[arg(long)]
    color_space: Option<ColorSpace>,

    /// Enlarged boxes leaving the frame: strict (skip) or clamp.
    #[arg(long)]
    crop_policy: Option<CropPolicy>,

    /// Which of the --box faces to analyze.
    #[arg(long)]
    face_index: Option<usize>,

    /// Run detection every Nth frame (1 = every frame).
    #[arg(long)]
    detect_every: Option<usize>,

    /// Fixed k-means seed for reproducible colors.
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (default: platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save each normalized face to this directory.
    #[arg(long)]
    dump_faces: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    config.validate()?;

    let detector = build_detector(&cli.boxes, config.detect_every)?;
    let classifier = build_classifier(cli.model.as_deref(), &config)?;

    let mut use_case = AnalyzeCatUseCase::new(
        Box::new(ImageFileReader::new()),
        detector,
        classifier,
        config,
        Box::new(LogPipelineLogger::new()),
    );
    if let Some(dir) = &cli.dump_faces {
        use_case = use_case.with_face_writer(Box::new(ImageFileWriter::new()), dir);
    }

    let results = use_case.execute(&cli.input)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}", format_result(result));
        }
    }
    log::info!("{} frames analyzed", results.len());
    Ok(())
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::load_or_default(),
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut AnalysisConfig) {
    if let Some(k) = cli.clusters {
        config.clusters = k;
    }
    if let Some(space) = cli.color_space {
        config.color_space = space;
    }
    if let Some(policy) = cli.crop_policy {
        config.crop_policy = policy;
    }
    if let Some(index) = cli.face_index {
        config.face_index = index;
    }
    if let Some(n) = cli.detect_every {
        config.detect_every = n;
    }
    if let Some(seed) = cli.seed {
        config.kmeans.seed = Some(seed);
    }
}

fn build_detector(
    boxes: &[BoundingBox],
    detect_every: usize,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let base: Box<dyn FaceDetector> = Box::new(StaticFaceDetector::new(boxes.to_vec()));
    if detect_every > 1 {
        Ok(Box::new(SkipFrameDetector::new(base, detect_every)?))
    } else {
        Ok(base)
    }
}

fn build_classifier(
    explicit: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<Option<Box<dyn PatternClassifier>>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {CLASSIFIER_MODEL_NAME}");
    let model_path =
        match model_resolver::resolve(CLASSIFIER_MODEL_NAME, explicit, Some(Path::new("models"))) {
            Ok(path) => path,
            // only an explicitly requested model is mandatory
            Err(e @ ModelResolveError::NotFound { .. }) if explicit.is_none() => {
                log::warn!("{e}; reporting colors only");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

    let classifier = OnnxPatternClassifier::new(&model_path, config.tensor_row_order)?;
    Ok(Some(Box::new(classifier)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.boxes.is_empty() {
        return Err("At least one --box x,y,w,h is required".into());
    }
    if let Some(index) = cli.face_index {
        if index >= cli.boxes.len() {
            return Err(format!(
                "Face index {index} out of range for {} boxes",
                cli.boxes.len()
            )
            .into());
        }
    }
    if let Some(dir) = &cli.dump_faces {
        if dir.is_file() {
            return Err(format!("--dump-faces must be a directory: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn format_result(result: &AnalysisResult) -> String {
    let colors: Vec<String> = result
        .clusters
        .iter()
        .map(|c| format!("{} ({} px)", c.color, c.pixel_count))
        .collect();
    let pattern = match &result.prediction {
        Some(p) => format!("{} {:.2}", p.pattern, p.confidence),
        None => "unclassified".to_string(),
    };
    format!(
        "frame {}: face {}  {}  colors {}",
        result.frame_index,
        result.face,
        pattern,
        colors.join(", ")
    )
}
