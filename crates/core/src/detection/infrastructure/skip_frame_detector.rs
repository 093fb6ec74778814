use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Decorator that runs detection every N frames, reusing results in between.
///
/// Boxes carry no identity, so skipped frames repeat the last detection
/// unchanged rather than extrapolating motion.
pub struct SkipFrameDetector {
    inner: Box<dyn FaceDetector>,
    interval: usize,
    frame_count: usize,
    last_boxes: Vec<BoundingBox>,
}

impl SkipFrameDetector {
    pub fn new(inner: Box<dyn FaceDetector>, interval: usize) -> Result<Self, &'static str> {
        if interval < 1 {
            return Err("detection interval must be >= 1");
        }
        Ok(Self {
            inner,
            interval,
            frame_count: 0,
            last_boxes: Vec::new(),
        })
    }
}

impl FaceDetector for SkipFrameDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if self.frame_count % self.interval == 0 {
            self.last_boxes = self.inner.detect(frame)?;
            log::trace!(
                "frame {}: detector found {} faces",
                frame.index(),
                self.last_boxes.len()
            );
        }
        self.frame_count += 1;
        Ok(self.last_boxes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeDetector {
        results: Vec<Vec<BoundingBox>>,
        calls: Arc<Mutex<usize>>,
    }

    impl FakeDetector {
        fn new(results: Vec<Vec<BoundingBox>>) -> (Self, Arc<Mutex<usize>>) {
            let calls = Arc::new(Mutex::new(0));
            (
                Self {
                    results,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl FaceDetector for FakeDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            let mut calls = self.calls.lock().unwrap();
            let result = self.results[*calls % self.results.len()].clone();
            *calls += 1;
            Ok(result)
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            Err("cascade not loaded".into())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, index)
    }

    fn bbox(x: i32) -> BoundingBox {
        BoundingBox::new(x, 20, 50, 50)
    }

    #[test]
    fn test_interval_1_delegates_every_frame() {
        let (inner, calls) = FakeDetector::new(vec![vec![bbox(10)]]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 1).unwrap();
        for i in 0..3 {
            assert_eq!(detector.detect(&frame(i)).unwrap().len(), 1);
        }
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[test]
    fn test_interval_5_runs_detector_on_every_fifth_frame() {
        let (inner, calls) = FakeDetector::new(vec![vec![bbox(10)]]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 5).unwrap();
        for i in 0..11 {
            detector.detect(&frame(i)).unwrap();
        }
        // frames 0, 5 and 10
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[test]
    fn test_skipped_frames_reuse_last_boxes() {
        let (inner, _) = FakeDetector::new(vec![vec![bbox(10)], vec![bbox(30), bbox(90)]]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 2).unwrap();

        let r0 = detector.detect(&frame(0)).unwrap();
        let r1 = detector.detect(&frame(1)).unwrap();
        let r2 = detector.detect(&frame(2)).unwrap();

        assert_eq!(r0, vec![bbox(10)]);
        assert_eq!(r1, r0);
        assert_eq!(r2, vec![bbox(30), bbox(90)]);
    }

    #[test]
    fn test_empty_detection_is_reused() {
        let (inner, _) = FakeDetector::new(vec![vec![]]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 2).unwrap();
        assert!(detector.detect(&frame(0)).unwrap().is_empty());
        assert!(detector.detect(&frame(1)).unwrap().is_empty());
    }

    #[test]
    fn test_inner_error_propagates() {
        let mut detector = SkipFrameDetector::new(Box::new(FailingDetector), 3).unwrap();
        assert!(detector.detect(&frame(0)).is_err());
    }

    #[test]
    fn test_interval_0_errors() {
        let (inner, _) = FakeDetector::new(vec![vec![]]);
        assert!(SkipFrameDetector::new(Box::new(inner), 0).is_err());
    }
}
