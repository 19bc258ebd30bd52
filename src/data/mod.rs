//! Dataset loading and binarization.
//!
//! MNIST images are thresholded into binary feature vectors and labels are
//! one-hot encoded. IDX decoding is delegated to the `mnist` crate; this
//! module only owns the binarize/encode/cap conversions, which are pure
//! functions so they stay testable without the dataset files on disk.

use mnist::{Mnist, MnistBuilder};
use ndarray::{Array2, ArrayView1};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

/// Side length of an MNIST image.
pub const IMAGE_SIDE: usize = 28;

/// Pixels per MNIST image.
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Standard IDX file names expected under the base path.
const IDX_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

/// Options for loading and binarizing MNIST.
#[derive(Debug, Clone)]
pub struct MnistOptions {
    /// Directory containing the four uncompressed IDX files.
    pub base_path: PathBuf,
    /// Brightness threshold: pixels strictly above it become 1, all others 0.
    pub threshold: u8,
    /// Cap on the number of training samples (`None` = full set).
    pub train_len: Option<usize>,
    /// Cap on the number of test samples (`None` = full set).
    pub test_len: Option<usize>,
}

impl Default for MnistOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data"),
            threshold: 127,
            train_len: None,
            test_len: None,
        }
    }
}

/// Aligned binary feature vectors and one-hot label vectors.
///
/// Immutable after loading. Rows of `features` are {0,1} patterns of a
/// fixed pixel count; rows of `labels` are one-hot over the class count
/// and sum to exactly 1.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Array2<f32>,
}

impl Dataset {
    /// Pair feature rows with label rows.
    ///
    /// # Errors
    ///
    /// `SampleMismatch` if the two matrices have different row counts.
    pub fn new(features: Array2<f32>, labels: Array2<f32>) -> Result<Self> {
        if features.nrows() != labels.nrows() {
            return Err(Error::SampleMismatch {
                features: features.nrows(),
                labels: labels.nrows(),
            });
        }
        Ok(Self { features, labels })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature vector length per sample.
    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    /// One-hot label length per sample (class count).
    #[must_use]
    pub fn label_dim(&self) -> usize {
        self.labels.ncols()
    }

    /// The `(features, label)` pair at row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn sample(&self, i: usize) -> (ArrayView1<'_, f32>, ArrayView1<'_, f32>) {
        (self.features.row(i), self.labels.row(i))
    }

    /// Iterate samples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f32>, ArrayView1<'_, f32>)> {
        self.features.outer_iter().zip(self.labels.outer_iter())
    }

    /// All feature rows.
    #[must_use]
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    /// All label rows.
    #[must_use]
    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }
}

/// Threshold raw pixel intensities into binary feature rows.
///
/// A pixel maps to 1.0 only when strictly greater than `threshold`; an
/// intensity equal to the threshold maps to 0.0. `cap` limits the number
/// of rows; a cap beyond the available count yields the full set.
#[must_use]
pub fn binarize_images(raw: &[u8], pixels: usize, threshold: u8, cap: Option<usize>) -> Array2<f32> {
    let available = raw.len() / pixels;
    let rows = cap.map_or(available, |c| c.min(available));

    let mut features = Array2::zeros((rows, pixels));
    for (i, mut row) in features.outer_iter_mut().enumerate() {
        let image = &raw[i * pixels..(i + 1) * pixels];
        for (v, &px) in row.iter_mut().zip(image) {
            *v = if px > threshold { 1.0 } else { 0.0 };
        }
    }
    features
}

/// One-hot encode digit labels over `classes` categories.
///
/// Each row has exactly one 1.0 at the label's index. `cap` limits the
/// number of rows as in [`binarize_images`].
#[must_use]
pub fn one_hot_labels(raw: &[u8], classes: usize, cap: Option<usize>) -> Array2<f32> {
    let rows = cap.map_or(raw.len(), |c| c.min(raw.len()));

    let mut labels = Array2::zeros((rows, classes));
    for (i, &digit) in raw.iter().take(rows).enumerate() {
        labels[[i, digit as usize]] = 1.0;
    }
    labels
}

/// Label cardinality observed in a raw label sequence (max label + 1).
#[must_use]
pub fn class_count(raw: &[u8]) -> usize {
    raw.iter().map(|&l| l as usize + 1).max().unwrap_or(0)
}

/// Load MNIST from disk, binarize, and one-hot encode.
///
/// Returns `(train, test)`. The class count is taken from the full
/// training label set before any cap is applied, and the test labels are
/// encoded over the same cardinality.
///
/// # Errors
///
/// `DataUnavailable` if any of the four IDX files is missing under
/// `options.base_path`. Not retried; decode failures inside the `mnist`
/// crate propagate as-is.
pub fn load_mnist(options: &MnistOptions) -> Result<(Dataset, Dataset)> {
    for name in IDX_FILES {
        let path = options.base_path.join(name);
        if !path.is_file() {
            return Err(Error::DataUnavailable(path.display().to_string()));
        }
    }

    let base = format!("{}/", options.base_path.display());
    let Mnist {
        trn_img,
        trn_lbl,
        tst_img,
        tst_lbl,
        ..
    } = MnistBuilder::new()
        .label_format_digit()
        .base_path(&base)
        .finalize();

    let classes = class_count(&trn_lbl);

    let train = Dataset::new(
        binarize_images(&trn_img, IMAGE_PIXELS, options.threshold, options.train_len),
        one_hot_labels(&trn_lbl, classes, options.train_len),
    )?;
    let test = Dataset::new(
        binarize_images(&tst_img, IMAGE_PIXELS, options.threshold, options.test_len),
        one_hot_labels(&tst_lbl, classes, options.test_len),
    )?;

    info!(
        train = train.len(),
        test = test.len(),
        classes,
        threshold = options.threshold,
        "loaded MNIST"
    );

    Ok((train, test))
}

/// Check whether the IDX files are present without loading them.
#[must_use]
pub fn mnist_available(base_path: &Path) -> bool {
    IDX_FILES.iter().all(|name| base_path.join(name).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_strict_threshold() {
        // Intensity equal to the threshold maps to 0, one above maps to 1.
        let t = 100u8;
        let raw = vec![t, t + 1, 0, 255];
        let features = binarize_images(&raw, 4, t, None);
        assert_eq!(features.shape(), &[1, 4]);
        assert_eq!(features[[0, 0]], 0.0);
        assert_eq!(features[[0, 1]], 1.0);
        assert_eq!(features[[0, 2]], 0.0);
        assert_eq!(features[[0, 3]], 1.0);
    }

    #[test]
    fn test_binarize_output_is_binary() {
        let raw: Vec<u8> = (0u16..=255).map(|v| v as u8).collect();
        let features = binarize_images(&raw, 16, 127, None);
        for &v in features.iter() {
            assert!(v == 0.0 || v == 1.0, "non-binary feature value {v}");
        }
    }

    #[test]
    fn test_binarize_cap() {
        let raw = vec![200u8; 4 * 3];
        let capped = binarize_images(&raw, 4, 127, Some(2));
        assert_eq!(capped.nrows(), 2);

        // Cap beyond available rows yields the full set.
        let full = binarize_images(&raw, 4, 127, Some(100));
        assert_eq!(full.nrows(), 3);
    }

    #[test]
    fn test_one_hot_rows_sum_to_one() {
        let raw = vec![0u8, 3, 9, 5];
        let labels = one_hot_labels(&raw, 10, None);
        assert_eq!(labels.shape(), &[4, 10]);
        for row in labels.outer_iter() {
            assert_eq!(row.sum(), 1.0);
        }
        assert_eq!(labels[[1, 3]], 1.0);
        assert_eq!(labels[[2, 9]], 1.0);
    }

    #[test]
    fn test_one_hot_cap() {
        let raw = vec![1u8, 2, 3];
        assert_eq!(one_hot_labels(&raw, 10, Some(2)).nrows(), 2);
        assert_eq!(one_hot_labels(&raw, 10, Some(7)).nrows(), 3);
    }

    #[test]
    fn test_class_count() {
        assert_eq!(class_count(&[0, 1, 2, 9, 4]), 10);
        assert_eq!(class_count(&[3]), 4);
        assert_eq!(class_count(&[]), 0);
    }

    #[test]
    fn test_dataset_row_mismatch() {
        let features = Array2::zeros((3, 4));
        let labels = Array2::zeros((2, 10));
        assert!(matches!(
            Dataset::new(features, labels),
            Err(Error::SampleMismatch { .. })
        ));
    }

    #[test]
    fn test_dataset_iteration_order() {
        let features = ndarray::array![[1.0, 0.0], [0.0, 1.0]];
        let labels = ndarray::array![[1.0, 0.0], [0.0, 1.0]];
        let data = Dataset::new(features, labels).unwrap();

        assert_eq!(data.len(), 2);
        let rows: Vec<_> = data.iter().collect();
        assert_eq!(rows[0].0[0], 1.0);
        assert_eq!(rows[1].0[0], 0.0);
    }

    #[test]
    fn test_load_missing_files() {
        let options = MnistOptions {
            base_path: PathBuf::from("/nonexistent/mnist"),
            ..MnistOptions::default()
        };
        assert!(matches!(
            load_mnist(&options),
            Err(Error::DataUnavailable(_))
        ));
    }
}
