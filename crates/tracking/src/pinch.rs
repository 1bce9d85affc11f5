use shared::domain::{Hand, NormalizedLandmark};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchReading {
    pub is_pinching: bool,
    /// Thumb-to-index distance scaled to calibration pixels.
    pub pixel_distance: f32,
}

/// Stateless thumb/index pinch threshold. Debouncing belongs to the state
/// machine, not here.
#[derive(Debug, Clone, Copy)]
pub struct PinchClassifier {
    threshold_px: f32,
    calibration_width: f32,
}

impl PinchClassifier {
    pub fn new(threshold_px: f32, calibration_width: f32) -> Self {
        Self {
            threshold_px,
            calibration_width,
        }
    }

    pub fn threshold_px(&self) -> f32 {
        self.threshold_px
    }

    pub fn classify(
        &self,
        thumb_tip: NormalizedLandmark,
        index_tip: NormalizedLandmark,
    ) -> PinchReading {
        let pixel_distance = thumb_tip.distance(&index_tip) * self.calibration_width;
        PinchReading {
            is_pinching: pixel_distance < self.threshold_px,
            pixel_distance,
        }
    }

    pub fn classify_hand(&self, hand: &Hand) -> PinchReading {
        self.classify(hand.thumb_tip(), hand.index_tip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_fingertips_pinch() {
        let classifier = PinchClassifier::new(50.0, 640.0);
        let reading = classifier.classify(
            NormalizedLandmark::new(0.50, 0.50),
            NormalizedLandmark::new(0.52, 0.50),
        );
        assert!((reading.pixel_distance - 12.8).abs() < 1e-3);
        assert!(reading.is_pinching);
    }

    #[test]
    fn spread_fingertips_do_not_pinch() {
        let classifier = PinchClassifier::new(50.0, 640.0);
        let hand = Hand::pointer(
            NormalizedLandmark::new(0.40, 0.40),
            NormalizedLandmark::new(0.40, 0.50),
        );
        let reading = classifier.classify_hand(&hand);
        assert!((reading.pixel_distance - 64.0).abs() < 1e-3);
        assert!(!reading.is_pinching);
    }

    #[test]
    fn threshold_is_exclusive() {
        let classifier = PinchClassifier::new(50.0, 100.0);
        let reading = classifier.classify(
            NormalizedLandmark::new(0.0, 0.0),
            NormalizedLandmark::new(0.5, 0.0),
        );
        assert_eq!(reading.pixel_distance, 50.0);
        assert!(!reading.is_pinching);
    }
}
