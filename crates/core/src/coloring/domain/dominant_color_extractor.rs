use ndarray::Array2;
use serde::Serialize;

use crate::shared::color::{ColorSpace, Rgb};
use crate::shared::error::CoreError;
use crate::shared::frame::Frame;

use super::kmeans::{kmeans, KMeansParams};

/// One dominant color found by clustering.
///
/// Clusters come back in k-means order, which says nothing about how
/// dominant a color is; use [`rank_by_dominance`] when that matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorCluster {
    /// Centroid in the working color space.
    pub centroid: [f32; 3],
    /// Centroid converted back to RGB for display.
    pub color: Rgb,
    /// Pixels assigned to this cluster.
    pub pixel_count: usize,
}

/// Clusters the pixel colors of `image` into at most `k` groups.
///
/// Pixels are projected into `space`, flattened without position, and
/// clustered with k-means. Fewer than `k` clusters are returned only when
/// the image holds fewer than `k` distinct colors.
pub fn extract_clusters(
    image: &Frame,
    k: usize,
    space: ColorSpace,
    params: &KMeansParams,
) -> Result<Vec<ColorCluster>, CoreError> {
    if image.is_empty() {
        return Err(CoreError::invalid("image has no pixels"));
    }
    if k == 0 {
        return Err(CoreError::invalid("cluster count must be positive"));
    }

    let samples = flatten(image, space)?;
    let result = kmeans(samples.view(), k, params)?;

    Ok(result
        .centroids
        .rows()
        .into_iter()
        .zip(result.counts.iter())
        .map(|(row, &pixel_count)| {
            let centroid = [row[0], row[1], row[2]];
            ColorCluster {
                centroid,
                color: space.to_rgb(centroid),
                pixel_count,
            }
        })
        .collect())
}

/// Dominant RGB colors of `image`, in k-means order.
pub fn extract_colors(
    image: &Frame,
    k: usize,
    space: ColorSpace,
    params: &KMeansParams,
) -> Result<Vec<Rgb>, CoreError> {
    Ok(extract_clusters(image, k, space, params)?
        .into_iter()
        .map(|c| c.color)
        .collect())
}

/// Orders clusters by pixel count, largest first. Ties keep their order.
pub fn rank_by_dominance(clusters: &[ColorCluster]) -> Vec<ColorCluster> {
    let mut ranked = clusters.to_vec();
    ranked.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    ranked
}

/// One `[c0, c1, c2]` row per pixel in the working space; alpha is dropped.
fn flatten(image: &Frame, space: ColorSpace) -> Result<Array2<f32>, CoreError> {
    let data: Vec<f32> = image
        .rgb_pixels()
        .flat_map(|px| space.project(px))
        .collect();
    Array2::from_shape_vec((image.pixel_count(), 3), data)
        .map_err(|e| CoreError::invalid(format!("pixel buffer does not match frame: {e}")))
}
