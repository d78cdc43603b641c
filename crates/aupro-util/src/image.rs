//! Image loading for anomaly evaluation.
//!
//! Every function reads the file from disk once; nothing is cached.

use std::path::Path;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{imageops::FilterType, DynamicImage, RgbImage};
use thiserror::Error;

/// Extensions accepted by [`is_supported_image_format`].
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Gray levels at or above this fraction of full scale are anomalous in a mask.
const MASK_THRESHOLD: f32 = 0.5;

/// ImageError covers all possible errors when loading evaluation images
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image at '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to convert tensor to data: {reason}")]
    TensorConversionError { reason: String },

    #[error("data length mismatch: expected {expected}, got {actual}")]
    DataLengthMismatch { expected: usize, actual: usize },
}

/// Result type alias for ImageError
pub type ImageResult<T> = Result<T, ImageError>;

fn open<P: AsRef<Path>>(path: P) -> ImageResult<DynamicImage> {
    image::open(&path).map_err(|source| ImageError::FileReadError {
        path: path.as_ref().display().to_string(),
        source,
    })
}

/// Reads an image from disk as 8-bit RGB.
///
/// Grayscale and alpha images are expanded or flattened to three channels. The buffer is
/// row-major `height x width x 3` in R, G, B order.
///
/// # Errors
///
/// Returns [`ImageError::FileReadError`] if the file is missing or cannot be decoded.
pub fn read_image<P: AsRef<Path>>(path: P) -> ImageResult<RgbImage> {
    Ok(open(path)?.into_rgb8())
}

/// Reads an image and resizes it exactly to `(width, height)`.
///
/// # Errors
///
/// Returns [`ImageError::FileReadError`] if the file is missing or cannot be decoded.
pub fn read_image_resized<P: AsRef<Path>>(path: P, size: (u32, u32)) -> ImageResult<RgbImage> {
    let resized = open(path)?.resize_exact(size.0, size.1, FilterType::Triangle);
    Ok(resized.into_rgb8())
}

/// Reads an image as a `[height, width, 3]` tensor holding raw `0..=255` values.
///
/// # Errors
///
/// Returns [`ImageError::FileReadError`] if the file is missing or cannot be decoded.
pub fn read_image_tensor<B: Backend, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> ImageResult<Tensor<B, 3>> {
    let img = read_image(path)?;
    let (width, height) = img.dimensions();
    let data: Vec<f32> = img.into_raw().into_iter().map(f32::from).collect();

    to_tensor(data, [height as usize, width as usize, 3], device)
}

/// Reads a ground-truth mask as a `[1, height, width]` tensor of zeros and ones.
///
/// Color masks are converted to luma first.
///
/// # Errors
///
/// Returns [`ImageError::FileReadError`] if the file is missing or cannot be decoded.
pub fn read_mask<B: Backend, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> ImageResult<Tensor<B, 3>> {
    let luma = open(path)?.to_luma32f();
    let (width, height) = luma.dimensions();
    let data: Vec<f32> = luma
        .into_raw()
        .into_iter()
        .map(|v| if v >= MASK_THRESHOLD { 1.0 } else { 0.0 })
        .collect();

    to_tensor(data, [1, height as usize, width as usize], device)
}

/// Reads an anomaly map as a `[1, height, width]` tensor scaled to `[0, 1]`.
///
/// 16-bit images keep their full precision.
///
/// # Errors
///
/// Returns [`ImageError::FileReadError`] if the file is missing or cannot be decoded.
pub fn read_anomaly_map<B: Backend, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> ImageResult<Tensor<B, 3>> {
    let luma = open(path)?.to_luma32f();
    let (width, height) = luma.dimensions();

    to_tensor(luma.into_raw(), [1, height as usize, width as usize], device)
}

/// Whether the path has an image extension the loader can decode.
pub fn is_supported_image_format<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Copies host pixels into a tensor of the given shape.
///
/// # Errors
///
/// Returns [`ImageError::DataLengthMismatch`] if `data` does not fill `shape` exactly.
pub fn to_tensor<B: Backend, const D: usize>(
    data: Vec<f32>,
    shape: [usize; D],
    device: &B::Device,
) -> ImageResult<Tensor<B, D>> {
    let expected: usize = shape.iter().product();
    if data.len() != expected {
        return Err(ImageError::DataLengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    let tensor_data = TensorData::new(data, shape).convert::<B::FloatElem>();
    Ok(Tensor::from_data(tensor_data, device))
}

/// Reads a tensor back to host `f32` values.
///
/// # Errors
///
/// Returns [`ImageError::TensorConversionError`] if the backend cannot produce the data.
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> ImageResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| ImageError::TensorConversionError {
            reason: format!("{e:?}"),
        })
}
