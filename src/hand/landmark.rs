//! Hand landmark prediction.

use std::path::Path;

use image::{imageops, RgbImage};

use crate::nn::Cnn;
use crate::resolution::Resolution;
use crate::timer::Timer;

/// Input resolution of the supported hand landmark networks.
const INPUT_RESOLUTION: Resolution = Resolution::new(224, 224);

/// Number of landmarks predicted per hand.
pub const NUM_LANDMARKS: usize = 21;

/// Hand presence score below which a frame is treated as containing no hand.
const MIN_PRESENCE: f32 = 0.5;

/// Names for the hand pose landmarks.
///
/// Each variant's discriminant is the landmark's index in a [`Landmarks`] set.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located
///   near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the
///   knuckles near the palm of the hand.
/// - **IP/PIP**: (Proximal) Interphalangeal joint, the joint between the MCP
///   and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the
///   DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// A set of 2D hand landmarks in frame pixel coordinates.
#[derive(Clone)]
pub struct Landmarks {
    positions: Box<[[f32; 2]]>,
}

impl Landmarks {
    /// Creates a new [`Landmarks`] collection containing `len` preallocated
    /// landmarks.
    ///
    /// All landmarks start out with all coordinates at `0.0`.
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![[0.0, 0.0]; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns a landmark's position in the source image's coordinate system.
    #[inline]
    pub fn position(&self, index: usize) -> [f32; 2] {
        self.positions[index]
    }

    /// Overwrites the position of the landmark at `index`.
    pub fn set(&mut self, index: usize, position: [f32; 2]) {
        self.positions[index] = position;
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [[f32; 2]] {
        &mut self.positions
    }
}

/// Landmark estimate for a single hand, computed by [`Landmarker`].
#[derive(Clone)]
pub struct LandmarkResult {
    landmarks: Landmarks,
    presence: f32,
}

impl LandmarkResult {
    /// Returns the predicted landmark positions.
    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// Returns the hand presence score reported by the network.
    #[inline]
    pub fn presence(&self) -> f32 {
        self.presence
    }
}

/// Estimates hand landmarks on full camera frames.
///
/// At most one hand is located per frame. The presence threshold is fixed when
/// the [`Landmarker`] is created.
pub struct Landmarker {
    cnn: Cnn,
    min_presence: f32,
    t_resize: Timer,
    t_infer: Timer,
}

impl Landmarker {
    /// Loads a hand landmark network from an ONNX file.
    pub fn new(model_path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            cnn: Cnn::load(model_path, INPUT_RESOLUTION)?,
            min_presence: MIN_PRESENCE,
            t_resize: Timer::new("resize"),
            t_infer: Timer::new("infer"),
        })
    }

    /// Computes hand landmarks on `frame`.
    ///
    /// Returns `None` when the network does not consider a hand present, which
    /// is a normal outcome, not an error. Otherwise the result holds exactly
    /// [`NUM_LANDMARKS`] landmarks with positions in `frame`'s pixel
    /// coordinate system.
    pub fn estimate(&mut self, frame: &RgbImage) -> anyhow::Result<Option<LandmarkResult>> {
        let input = self.t_resize.time(|| {
            imageops::resize(
                frame,
                INPUT_RESOLUTION.width(),
                INPUT_RESOLUTION.height(),
                imageops::FilterType::Triangle,
            )
        });
        let outputs = self.t_infer.time(|| self.cnn.estimate(&input))?;

        let presence = outputs.flat(1, &[1, 1])[0];
        if presence < self.min_presence {
            log::trace!("hand presence {presence} below threshold");
            return Ok(None);
        }

        // The network outputs `x y z` triplets in its own input pixel space;
        // the Z coordinate is relative depth and unused here.
        let coords = outputs.flat(0, &[1, NUM_LANDMARKS * 3]);
        let scale_x = frame.width() as f32 / INPUT_RESOLUTION.width() as f32;
        let scale_y = frame.height() as f32 / INPUT_RESOLUTION.height() as f32;

        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        for (out, xyz) in landmarks.positions_mut().iter_mut().zip(coords.chunks_exact(3)) {
            *out = [xyz[0] * scale_x, xyz[1] * scale_y];
        }

        Ok(Some(LandmarkResult {
            landmarks,
            presence,
        }))
    }

    /// Returns profiling timers for preprocessing and inference.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_resize, &self.t_infer]
    }
}
