use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::avatar::domain::avatar_appearance::AvatarAppearance;
use crate::classification::domain::pattern_classifier::{PatternClassifier, Prediction};
use crate::coloring::domain::dominant_color_extractor::{
    extract_clusters, rank_by_dominance, ColorCluster,
};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_normalizer::normalize;
use crate::detection::domain::face_region_extractor::extract_face;
use crate::pipeline::pipeline_logger::{stage, PipelineLogger};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::AnalysisConfig;
use crate::shared::constants::NORMALIZED_SIZE;
use crate::shared::frame::Frame;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::image_writer::ImageWriter;

/// What one capture cycle learned about the cat in front of the camera.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub frame_index: usize,
    /// Detector box the face was cut from, before enlargement.
    pub face: BoundingBox,
    /// Coat colors, most dominant first.
    pub clusters: Vec<ColorCluster>,
    /// `None` when running without a classifier.
    pub prediction: Option<Prediction>,
    pub appearance: Option<AvatarAppearance>,
}

/// Capture analysis: read → detect → crop → normalize → cluster → classify.
pub struct AnalyzeCatUseCase {
    /// Taken out while `execute` iterates it.
    reader: Option<Box<dyn FrameReader>>,
    detector: Box<dyn FaceDetector>,
    classifier: Option<Box<dyn PatternClassifier>>,
    config: AnalysisConfig,
    logger: Box<dyn PipelineLogger>,
    face_writer: Option<(Box<dyn ImageWriter>, PathBuf)>,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl AnalyzeCatUseCase {
    pub fn new(
        reader: Box<dyn FrameReader>,
        detector: Box<dyn FaceDetector>,
        classifier: Option<Box<dyn PatternClassifier>>,
        config: AnalysisConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader: Some(reader),
            detector,
            classifier,
            config,
            logger,
            face_writer: None,
        }
    }

    /// Dumps every normalized face as `face_<frame>.png` under `dir`.
    pub fn with_face_writer(mut self, writer: Box<dyn ImageWriter>, dir: &Path) -> Self {
        self.face_writer = Some((writer, dir.to_path_buf()));
        self
    }

    /// Runs one capture cycle.
    ///
    /// Returns `Ok(None)` when the frame has no usable face (nothing
    /// detected, fewer faces than `face_index` needs, or the enlarged box
    /// leaves the frame under the strict crop policy); the next frame
    /// simply tries again.
    pub fn analyze_frame(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<AnalysisResult>, Box<dyn std::error::Error>> {
        let t = Instant::now();
        let boxes = self.detector.detect(frame)?;
        self.logger.timing(stage::DETECT, elapsed_ms(t));

        let index = self.config.face_index;
        if !boxes.is_empty() && index >= boxes.len() {
            self.skip(
                frame,
                &format!("face {index} requested, {} detected", boxes.len()),
            );
            return Ok(None);
        }

        let t = Instant::now();
        let face = match extract_face(&boxes, frame, index, self.config.crop_policy) {
            Ok(face) => face,
            Err(e) if e.skips_cycle() => {
                self.skip(frame, &e);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        self.logger.timing(stage::CROP, elapsed_ms(t));
        let bbox = boxes[index];

        let t = Instant::now();
        let normalized = normalize(&face)?;
        self.logger.timing(stage::NORMALIZE, elapsed_ms(t));

        if let Some((writer, dir)) = &self.face_writer {
            let path = dir.join(format!("face_{:05}.png", frame.index()));
            writer.write(&path, &normalized, Some((NORMALIZED_SIZE, NORMALIZED_SIZE)))?;
        }

        let t = Instant::now();
        let clusters = extract_clusters(
            &normalized,
            self.config.clusters,
            self.config.color_space,
            &self.config.kmeans,
        )?;
        self.logger.timing(stage::KMEANS, elapsed_ms(t));
        let clusters = rank_by_dominance(&clusters);

        let prediction = match self.classifier.as_mut() {
            Some(classifier) => {
                let t = Instant::now();
                let prediction = classifier.classify(&normalized)?;
                self.logger.timing(stage::CLASSIFY, elapsed_ms(t));
                Some(prediction)
            }
            None => None,
        };

        let appearance = match prediction {
            Some(p) => {
                let colors: Vec<_> = clusters.iter().map(|c| c.color).collect();
                Some(AvatarAppearance::build(p.pattern, &colors)?)
            }
            None => None,
        };

        Ok(Some(AnalysisResult {
            frame_index: frame.index(),
            face: bbox,
            clusters,
            prediction,
            appearance,
        }))
    }

    /// Analyzes every frame from `input`, returning one result per usable frame.
    ///
    /// Frames the reader fails to decode are logged and skipped.
    pub fn execute(
        &mut self,
        input: &Path,
    ) -> Result<Vec<AnalysisResult>, Box<dyn std::error::Error>> {
        self.config.validate()?;
        let mut reader = self.reader.take().ok_or("frame reader is already in use")?;
        let outcome = self.analyze_all(reader.as_mut(), input);
        reader.close();
        self.reader = Some(reader);

        let results = outcome?;
        self.logger.metric("analyzed_frames", results.len() as f64);
        self.logger.summary();
        Ok(results)
    }

    fn analyze_all(
        &mut self,
        reader: &mut dyn FrameReader,
        input: &Path,
    ) -> Result<Vec<AnalysisResult>, Box<dyn std::error::Error>> {
        let total = reader.open(input)?;
        self.logger
            .info(&format!("Analyzing {} ({total} frames)", input.display()));

        let mut results = Vec::new();
        for (i, frame) in reader.frames().enumerate() {
            match frame {
                Ok(frame) => {
                    if let Some(result) = self.analyze_frame(&frame)? {
                        results.push(result);
                    }
                }
                Err(e) => {
                    log::warn!("frame {i}: {e}; skipped");
                    self.logger.metric("unreadable_frames", 1.0);
                }
            }
            self.logger.progress(i + 1, total);
        }
        Ok(results)
    }

    fn skip(&mut self, frame: &Frame, reason: &dyn std::fmt::Display) {
        log::debug!("frame {}: skipped ({reason})", frame.index());
        self.logger.metric("skipped_frames", 1.0);
    }
}
