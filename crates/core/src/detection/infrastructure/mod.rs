pub mod skip_frame_detector;
pub mod static_face_detector;
