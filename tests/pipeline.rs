use std::net::UdpSocket;
use std::time::Duration;

use approx::assert_relative_eq;
use dactylo::cmd::Twist;
use dactylo::hand::fingers::{Finger, ALL_FINGERS};
use dactylo::hand::landmark::{LandmarkIdx, Landmarks, NUM_LANDMARKS};
use dactylo::teleop::command_for_landmarks;
use dactylo::transport::TwistPublisher;

/// Builds a landmark set where exactly the given fingers are extended.
fn hand_with_extended(fingers: &[Finger]) -> Landmarks {
    let mut landmarks = Landmarks::new(NUM_LANDMARKS);
    for i in 0..NUM_LANDMARKS {
        landmarks.set(i, [100.0, 100.0]);
    }
    landmarks.set(LandmarkIdx::ThumbTip as usize, [80.0, 100.0]);
    for finger in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky] {
        landmarks.set(finger.tip() as usize, [100.0, 120.0]);
    }

    for &finger in fingers {
        match finger {
            Finger::Thumb => landmarks.set(finger.tip() as usize, [120.0, 100.0]),
            _ => landmarks.set(finger.tip() as usize, [100.0, 80.0]),
        }
    }
    landmarks
}

#[test]
fn one_finger_drives_forward() {
    let twist = command_for_landmarks(&hand_with_extended(&[Finger::Index]))
        .expect("one extended finger must produce a command");
    assert_relative_eq!(twist.linear.x, 0.2);
    assert_relative_eq!(twist.angular.z, 0.0);
}

#[test]
fn two_fingers_drive_backward() {
    let twist = command_for_landmarks(&hand_with_extended(&[Finger::Index, Finger::Middle]))
        .expect("two extended fingers must produce a command");
    assert_relative_eq!(twist.linear.x, -0.2);
    assert_relative_eq!(twist.angular.z, 0.0);
}

#[test]
fn three_fingers_turn_left() {
    let twist = command_for_landmarks(&hand_with_extended(&[
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
    ]))
    .expect("three extended fingers must produce a command");
    assert_relative_eq!(twist.linear.x, 0.0);
    assert_relative_eq!(twist.angular.z, 0.2);
}

#[test]
fn open_hand_commands_a_stop() {
    let twist = command_for_landmarks(&hand_with_extended(&ALL_FINGERS))
        .expect("an open hand must produce a command");
    assert_relative_eq!(twist.linear.x, 0.0);
    assert_relative_eq!(twist.angular.z, 0.0);
}

#[test]
fn curled_hand_produces_no_command() {
    assert_eq!(command_for_landmarks(&hand_with_extended(&[])), None);
}

#[test]
fn repeated_frames_yield_independent_identical_commands() {
    // No smoothing and no integration: the same pose on N consecutive frames
    // must derive the exact same command N times.
    let landmarks = hand_with_extended(&[Finger::Index]);

    let commands: Vec<Option<Twist>> =
        (0..10).map(|_| command_for_landmarks(&landmarks)).collect();

    let first = commands[0].expect("one extended finger must produce a command");
    assert_relative_eq!(first.linear.x, 0.2);
    for command in &commands {
        assert_eq!(*command, Some(first));
    }
}

#[test]
fn published_commands_round_trip_over_the_wire() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let dest = receiver.local_addr().unwrap().to_string();

    let publisher = TwistPublisher::new("/cmd_vel".to_string(), &dest).unwrap();
    let expected =
        command_for_landmarks(&hand_with_extended(&[Finger::Index])).expect("command expected");
    publisher.publish(expected);
    // Joins the sender thread, which flushes the queue before exiting.
    drop(publisher);

    let mut buf = [0; 128];
    let (len, _) = receiver.recv_from(&mut buf).unwrap();
    let (topic, twist): (String, Twist) = rmp_serde::from_slice(&buf[..len]).unwrap();
    assert_eq!(topic, "/cmd_vel");
    assert_eq!(twist, expected);
}
