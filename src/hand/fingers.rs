//! Finger extension classification.
//!
//! Classification is purely geometric: each finger's tip landmark is compared
//! against a reference joint of the same finger. No information is carried
//! across frames.

use crate::hand::landmark::{LandmarkIdx, Landmarks, NUM_LANDMARKS};

/// The five fingers, in landmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

/// A list of all [`Finger`]s, thumb to pinky.
pub const ALL_FINGERS: [Finger; 5] = [
    Finger::Thumb,
    Finger::Index,
    Finger::Middle,
    Finger::Ring,
    Finger::Pinky,
];

impl Finger {
    /// Returns the landmark at this finger's tip.
    pub fn tip(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::ThumbTip,
            Finger::Index => LandmarkIdx::IndexFingerTip,
            Finger::Middle => LandmarkIdx::MiddleFingerTip,
            Finger::Ring => LandmarkIdx::RingFingerTip,
            Finger::Pinky => LandmarkIdx::PinkyTip,
        }
    }

    /// Returns the joint the tip is compared against: the IP joint right below
    /// the thumb's tip, the PIP joint two landmarks below every other tip.
    pub fn reference(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::ThumbIp,
            Finger::Index => LandmarkIdx::IndexFingerPip,
            Finger::Middle => LandmarkIdx::MiddleFingerPip,
            Finger::Ring => LandmarkIdx::RingFingerPip,
            Finger::Pinky => LandmarkIdx::PinkyPip,
        }
    }
}

/// Which of the five fingers count as extended, in thumb-to-pinky order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState([bool; 5]);

impl FingerState {
    /// Classifies finger extension from a full set of hand landmarks.
    ///
    /// The thumb is compared along X: it counts as extended when its tip lies
    /// right of its IP joint. This assumes a specific hand orientation towards
    /// the camera and is kept as-is rather than made anatomically robust. The
    /// remaining fingers are compared along Y: a finger counts as extended
    /// when its tip lies above its PIP joint on screen.
    ///
    /// # Panics
    ///
    /// Panics when `landmarks` does not contain exactly [`NUM_LANDMARKS`]
    /// entries. A partial landmark set has no meaningful pose.
    pub fn classify(landmarks: &Landmarks) -> Self {
        assert_eq!(
            landmarks.len(),
            NUM_LANDMARKS,
            "hand landmark set must contain exactly {NUM_LANDMARKS} points",
        );

        let mut extended = [false; 5];
        for (state, finger) in extended.iter_mut().zip(ALL_FINGERS) {
            let tip = landmarks.position(finger.tip() as usize);
            let reference = landmarks.position(finger.reference() as usize);
            *state = match finger {
                Finger::Thumb => tip[0] > reference[0],
                _ => tip[1] < reference[1],
            };
        }
        Self(extended)
    }

    /// Returns whether `finger` is classified as extended.
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    /// Returns the number of extended fingers, 0 to 5.
    pub fn extended_count(&self) -> u8 {
        self.0.iter().filter(|&&extended| extended).count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a landmark set where exactly the given fingers are extended.
    fn hand_with_extended(fingers: &[Finger]) -> Landmarks {
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        for i in 0..NUM_LANDMARKS {
            landmarks.set(i, [100.0, 100.0]);
        }
        // Start from a fully curled pose: thumb tip left of its reference,
        // every other tip below its reference.
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
    fn no_fingers_extended() {
        let state = FingerState::classify(&hand_with_extended(&[]));
        assert_eq!(state.extended_count(), 0);
        for finger in ALL_FINGERS {
            assert!(!state.is_extended(finger));
        }
    }

    #[test]
    fn all_fingers_extended() {
        let state = FingerState::classify(&hand_with_extended(&ALL_FINGERS));
        assert_eq!(state.extended_count(), 5);
        for finger in ALL_FINGERS {
            assert!(state.is_extended(finger));
        }
    }

    #[test]
    fn index_only() {
        let state = FingerState::classify(&hand_with_extended(&[Finger::Index]));
        assert_eq!(state.extended_count(), 1);
        assert!(state.is_extended(Finger::Index));
        assert!(!state.is_extended(Finger::Thumb));
        assert!(!state.is_extended(Finger::Middle));
    }

    #[test]
    fn thumb_extension_uses_x_axis() {
        // Moving the thumb tip up must not count as extension, only moving it
        // to the right of the IP joint does.
        let mut landmarks = hand_with_extended(&[]);
        landmarks.set(LandmarkIdx::ThumbTip as usize, [80.0, 10.0]);
        assert_eq!(FingerState::classify(&landmarks).extended_count(), 0);

        landmarks.set(LandmarkIdx::ThumbTip as usize, [120.0, 100.0]);
        let state = FingerState::classify(&landmarks);
        assert!(state.is_extended(Finger::Thumb));
        assert_eq!(state.extended_count(), 1);
    }

    #[test]
    fn tip_on_reference_is_not_extended() {
        // Exact ties count as curled for every finger.
        let mut landmarks = hand_with_extended(&[]);
        for finger in ALL_FINGERS {
            landmarks.set(finger.tip() as usize, [100.0, 100.0]);
        }
        assert_eq!(FingerState::classify(&landmarks).extended_count(), 0);
    }

    #[test]
    #[should_panic(expected = "21 points")]
    fn partial_landmark_set_is_rejected() {
        FingerState::classify(&Landmarks::new(17));
    }
}
