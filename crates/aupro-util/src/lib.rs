//! Image loading utilities for AUPRO evaluation.

pub mod image;

pub use image::{
    is_supported_image_format, read_anomaly_map, read_image, read_image_resized,
    read_image_tensor, read_mask, ImageError, ImageResult,
};
