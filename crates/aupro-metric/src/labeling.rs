//! Connected-component labeling of ground-truth masks.
//!
//! The metric only needs "binary mask in, label map out", so the algorithm sits behind
//! [`ComponentLabeler`]. The default implementation composes `imageproc`'s two-pass
//! union-find labeling.

use burn::prelude::*;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

/// Pixel adjacency used to grow a region.
#[derive(Config, Debug, PartialEq, Eq, Hash)]
pub enum RegionConnectivity {
    /// Only the four cardinal neighbours are adjacent.
    Four,
    /// All eight surrounding pixels are adjacent.
    Eight,
}

impl Default for RegionConnectivity {
    fn default() -> Self {
        Self::Eight
    }
}

impl From<&RegionConnectivity> for Connectivity {
    fn from(value: &RegionConnectivity) -> Self {
        match value {
            RegionConnectivity::Four => Self::Four,
            RegionConnectivity::Eight => Self::Eight,
        }
    }
}

/// Labels maximal connected groups of foreground pixels.
pub trait ComponentLabeler {
    /// Labels a row-major `height x width` mask.
    ///
    /// Returns a label per pixel: 0 for background, a positive id shared by every pixel of
    /// the same region. Ids need not be contiguous.
    fn label(&self, mask: &[bool], height: usize, width: usize) -> Vec<u32>;
}

/// [`ComponentLabeler`] backed by `imageproc::region_labelling`.
#[derive(Debug, Clone)]
pub struct ImageprocLabeler {
    connectivity: Connectivity,
}

impl ImageprocLabeler {
    /// Creates a labeler with the given adjacency.
    pub fn new(connectivity: &RegionConnectivity) -> Self {
        Self {
            connectivity: connectivity.into(),
        }
    }
}

impl Default for ImageprocLabeler {
    fn default() -> Self {
        Self::new(&RegionConnectivity::default())
    }
}

impl ComponentLabeler for ImageprocLabeler {
    fn label(&self, mask: &[bool], height: usize, width: usize) -> Vec<u32> {
        debug_assert_eq!(mask.len(), height * width);

        let image = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            Luma([u8::from(mask[y as usize * width + x as usize])])
        });

        connected_components(&image, self.connectivity, Luma([0u8])).into_raw()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::*;

    use super::*;

    fn diagonal_pair() -> Vec<bool> {
        #[rustfmt::skip]
        let mask = [
            1, 0, 0,
            0, 1, 0,
            0, 0, 0,
        ];
        mask.iter().map(|&v| v == 1).collect()
    }

    fn distinct_regions(labels: &[u32]) -> BTreeSet<u32> {
        labels.iter().copied().filter(|&l| l != 0).collect()
    }

    #[rstest]
    #[case(RegionConnectivity::Eight, 1)]
    #[case(RegionConnectivity::Four, 2)]
    fn diagonal_neighbours_depend_on_connectivity(
        #[case] connectivity: RegionConnectivity,
        #[case] expected_regions: usize,
    ) {
        let labeler = ImageprocLabeler::new(&connectivity);
        let labels = labeler.label(&diagonal_pair(), 3, 3);

        assert_eq!(distinct_regions(&labels).len(), expected_regions);
    }

    #[test]
    fn background_stays_zero() {
        let mask = diagonal_pair();
        let labels = ImageprocLabeler::default().label(&mask, 3, 3);

        for (is_foreground, label) in mask.iter().zip(&labels) {
            assert_eq!(*is_foreground, *label != 0);
        }
    }

    #[test]
    fn separated_blobs_get_distinct_labels() {
        #[rustfmt::skip]
        let mask: Vec<bool> = [
            1, 1, 0, 0, 0,
            1, 1, 0, 0, 1,
            0, 0, 0, 0, 1,
        ]
        .iter()
        .map(|&v| v == 1)
        .collect();

        let labels = ImageprocLabeler::default().label(&mask, 3, 5);

        assert_eq!(labels[0], labels[6]);
        assert_eq!(labels[9], labels[14]);
        assert_ne!(labels[0], labels[9]);
        assert_eq!(distinct_regions(&labels).len(), 2);
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let labels = ImageprocLabeler::default().label(&[false; 12], 3, 4);
        assert!(labels.iter().all(|&l| l == 0));
    }
}
