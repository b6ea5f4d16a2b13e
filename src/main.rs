use std::path::PathBuf;

use clap::Parser;
use dactylo::camera::Camera;
use dactylo::hand::landmark::Landmarker;
use dactylo::teleop::Teleop;
use dactylo::transport::TwistPublisher;

/// Reads camera frames, counts extended fingers, and publishes the matching
/// velocity command to a robot motion topic.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Index of the video capture device to read frames from.
    #[arg(short, long, default_value_t = 0)]
    input: u32,

    /// Topic name attached to every published command.
    #[arg(short, long, default_value = "/cmd_vel")]
    publisher: String,

    /// Destination address for command datagrams.
    #[arg(long, default_value = "127.0.0.1:4826")]
    dest: String,

    /// Path to the hand landmark model in ONNX format.
    #[arg(short, long, default_value = "models/hand_landmark_lite.onnx")]
    model: PathBuf,
}

fn main() -> anyhow::Result<()> {
    dactylo::init_logger!();

    let args = Args::parse();

    let camera = Camera::open(args.input)?;
    let landmarker = Landmarker::new(&args.model)?;
    let publisher = TwistPublisher::new(args.publisher, &args.dest)?;

    Teleop::new(camera, landmarker, publisher).run()
}
