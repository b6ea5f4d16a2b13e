//! The teleoperation loop.

use image::RgbImage;

use crate::camera::Camera;
use crate::cmd::{self, Twist};
use crate::hand::fingers::FingerState;
use crate::hand::landmark::{Landmarker, Landmarks};
use crate::timer::FpsCounter;
use crate::transport::TwistPublisher;

/// Owns every stage of the pipeline: the capture device, the landmark
/// estimator, and the command publisher.
///
/// Frames are processed strictly one at a time; each iteration blocks on the
/// camera, classifies, publishes, and only then reads the next frame.
pub struct Teleop {
    camera: Camera,
    landmarker: Landmarker,
    publisher: TwistPublisher,
    fps: FpsCounter,
}

impl Teleop {
    pub fn new(camera: Camera, landmarker: Landmarker, publisher: TwistPublisher) -> Self {
        Self {
            camera,
            landmarker,
            publisher,
            fps: FpsCounter::new("teleop"),
        }
    }

    /// Runs the frame loop until the camera stream ends.
    ///
    /// A camera read error is the normal way for this to return: it is logged
    /// and reported as success, not propagated.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let frame = match self.camera.read() {
                Ok(frame) => frame,
                Err(e) => {
                    log::info!("camera stream ended: {e}");
                    return Ok(());
                }
            };

            if let Some(twist) = self.process_frame(&frame)? {
                self.publisher.publish(twist);
            }

            self.fps.tick_with(
                self.camera
                    .timers()
                    .into_iter()
                    .chain(self.landmarker.timers()),
            );
        }
    }

    /// Derives the command for a single frame, if any.
    ///
    /// Frames without a detected hand contribute no command.
    fn process_frame(&mut self, frame: &RgbImage) -> anyhow::Result<Option<Twist>> {
        let Some(estimate) = self.landmarker.estimate(frame)? else {
            return Ok(None);
        };
        Ok(command_for_landmarks(estimate.landmarks()))
    }
}

/// Maps one frame's landmarks to the command to publish, if any.
///
/// This is the entire per-frame decision. It depends on nothing but the given
/// landmarks, so identical landmark sets always produce identical commands,
/// regardless of frame history.
pub fn command_for_landmarks(landmarks: &Landmarks) -> Option<Twist> {
    let fingers = FingerState::classify(landmarks);
    cmd::command_for(fingers.extended_count())
}
