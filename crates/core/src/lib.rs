//! Cat face normalization, coat color clustering and pattern classification.
//!
//! Each bounded context keeps pure logic and traits under `domain` and
//! adapters to files and ONNX Runtime under `infrastructure`.

pub mod shared {
    pub mod bounding_box;
    pub mod color;
    pub mod config;
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod model_resolver;
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
        pub mod face_normalizer;
        pub mod face_region_extractor;
    }
    pub mod infrastructure;
}

pub mod coloring {
    pub mod domain {
        pub mod dominant_color_extractor;
        pub mod kmeans;
    }
}

pub mod classification {
    pub mod domain {
        pub mod pattern_classifier;
        pub mod tensor_adapter;
    }
    pub mod infrastructure;
}

pub mod avatar {
    pub mod domain {
        pub mod avatar_appearance;
    }
}

pub mod video {
    pub mod domain {
        pub mod frame_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod analyze_cat_use_case;
    pub mod pipeline_logger;
}
