//! Neural network inference.
//!
//! Wraps the tract ONNX runtime behind a small interface for CNNs that operate
//! on fixed-size RGB image data.

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context};
use image::RgbImage;
use tract_onnx::prelude::{
    tvec, Datum, Framework, Graph, InferenceFact, InferenceModelExt, SimplePlan, TValue, TVec,
    Tensor, TypedFact, TypedOp,
};

use crate::resolution::Resolution;

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A convolutional neural network (CNN) that operates on image data.
///
/// Networks using this interface take a single sRGB input in NCHW layout, with
/// color values scaled to a range of `[0.0, 1.0]`.
pub struct Cnn {
    model: Model,
    input_res: Resolution,
}

impl Cnn {
    /// Loads an ONNX model from `path`.
    ///
    /// The network input is pinned to `[1, 3, h, w]` for the given resolution,
    /// so models with a symbolic batch dimension work too.
    pub fn load(path: &Path, input_res: Resolution) -> anyhow::Result<Self> {
        let (w, h) = (input_res.width() as usize, input_res.height() as usize);
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("failed to read ONNX model from {}", path.display()))?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, h, w)))?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, input_res })
    }

    /// Returns the expected input image resolution.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Runs the network on `image`, which must match the input resolution.
    pub fn estimate(&self, image: &RgbImage) -> anyhow::Result<Outputs> {
        ensure!(
            image.width() == self.input_res.width() && image.height() == self.input_res.height(),
            "input image is {}x{}, network expects {}",
            image.width(),
            image.height(),
            self.input_res,
        );

        let (w, h) = (self.input_res.width() as usize, self.input_res.height() as usize);
        let mut data = vec![0.0; 3 * h * w];
        for (x, y, pixel) in image.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                data[c * h * w + y * w + x] = f32::from(pixel[c]) / 255.0;
            }
        }
        let tensor = Tensor::from_shape(&[1, 3, h, w], &data)?;

        let outputs = self.model.run(tvec!(TValue::from_const(Arc::new(tensor))))?;
        Ok(Outputs { inner: outputs })
    }
}

/// The output tensors computed by an inference pass.
pub struct Outputs {
    inner: TVec<TValue>,
}

impl Outputs {
    /// Returns the number of output tensors.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns output `index` as a flat `f32` slice.
    ///
    /// # Panics
    ///
    /// Panics when the tensor's shape differs from `shape` or its element type
    /// is not `f32`. Both indicate a network that violates the caller's output
    /// contract, which extraction code must not silently ignore.
    pub fn flat(&self, index: usize, shape: &[usize]) -> &[f32] {
        let tensor = &self.inner[index];
        assert_eq!(
            tensor.shape(),
            shape,
            "unexpected shape of model output #{index}"
        );
        tensor
            .as_slice::<f32>()
            .expect("model output is not of type f32")
    }
}
