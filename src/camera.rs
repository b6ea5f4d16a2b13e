//! V4L2 camera access.
//!
//! Only `VIDEO_CAPTURE` devices yielding JFIF JPEG or Motion JPEG frames are
//! supported.

use std::path::PathBuf;

use anyhow::{bail, Context};
use image::RgbImage;
use linuxvideo::{
    format::{PixFormat, PixelFormat},
    stream::ReadStream,
    CapabilityFlags, Device,
};

use crate::resolution::Resolution;
use crate::timer::Timer;

/// Capture resolution requested from every device.
///
/// The driver may negotiate a different format; whatever it settles on is
/// logged and used for the rest of the session.
pub const CAPTURE_RESOLUTION: Resolution = Resolution::new(640, 480);

/// A camera yielding a stream of RGB frames.
pub struct Camera {
    stream: ReadStream,
    width: u32,
    height: u32,
    t_dequeue: Timer,
    t_decode: Timer,
}

impl Camera {
    /// Opens the capture device with the given index (`/dev/video<index>`).
    ///
    /// This function can block for a significant amount of time while the
    /// device initializes (on the order of hundreds of milliseconds).
    pub fn open(index: u32) -> anyhow::Result<Self> {
        let path = PathBuf::from(format!("/dev/video{index}"));
        let dev = Device::open(&path)
            .with_context(|| format!("failed to open capture device {}", path.display()))?;

        let caps = dev.capabilities()?.device_capabilities();
        log::debug!("device {} capabilities: {:?}", path.display(), caps);
        if !caps.contains(CapabilityFlags::VIDEO_CAPTURE) {
            bail!("device {} does not support video capture", path.display());
        }

        let capture = dev.video_capture(PixFormat::new(
            CAPTURE_RESOLUTION.width(),
            CAPTURE_RESOLUTION.height(),
            PixelFormat::MJPG,
        ))?;

        let format = capture.format();
        let width = format.width();
        let height = format.height();
        match format.pixel_format() {
            PixelFormat::JPEG | PixelFormat::MJPG => {}
            other => bail!("unsupported pixel format {}", other),
        }

        log::info!(
            "opened {}, {}x{} {}",
            path.display(),
            width,
            height,
            format.pixel_format(),
        );

        let stream = capture.into_stream()?;

        Ok(Self {
            stream,
            width,
            height,
            t_dequeue: Timer::new("dequeue"),
            t_decode: Timer::new("decode"),
        })
    }

    /// Returns the negotiated capture resolution.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Reads the next frame from the camera.
    ///
    /// If no frame is available, this method will block until one is. An error
    /// means the stream has ended; there is no recovery path, callers are
    /// expected to stop reading.
    pub fn read(&mut self) -> anyhow::Result<RgbImage> {
        let dequeue_guard = self.t_dequeue.start();
        let image = self.stream.dequeue(|buf| {
            drop(dequeue_guard);
            let image = match self.t_decode.time(|| decode_jpeg(&buf)) {
                Ok(image) => image,
                Err(e) => {
                    // Even high-quality webcams produce occasional corrupted
                    // MJPG frames, presumably due to USB data corruption.
                    log::error!("camera decode error: {}", e);

                    // Hand back a blank frame. Skipping it instead would cause
                    // a 2x latency spike, and a blank frame yields no landmarks
                    // either way.
                    RgbImage::new(self.width, self.height)
                }
            };
            Ok(image)
        })?;
        Ok(image)
    }

    /// Returns profiling timers for camera access and decoding.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_dequeue, &self.t_decode]
    }
}

fn decode_jpeg(data: &[u8]) -> anyhow::Result<RgbImage> {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?;
    Ok(image.to_rgb8())
}
