//! Compile-time backend choice for the evaluator.

use burn::tensor::backend::Backend;
use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "wgpu")] {
        /// Backend the evaluator runs on.
        pub type SelectedBackend = burn::backend::Wgpu;
        /// Backend name for logs and `aupro info`.
        pub const BACKEND_NAME: &str = "WGPU (GPU)";
    } else {
        /// Backend the evaluator runs on.
        pub type SelectedBackend = burn::backend::NdArray;
        /// Backend name for logs and `aupro info`.
        pub const BACKEND_NAME: &str = "NdArray (CPU)";
    }
}

/// Device type of [`SelectedBackend`].
pub type SelectedDevice = <SelectedBackend as Backend>::Device;

/// The default device of the selected backend.
pub fn create_device() -> SelectedDevice {
    SelectedDevice::default()
}
