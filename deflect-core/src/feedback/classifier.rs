//! Proximity classifier
//!
//! Samples the shared state once per tick, derives the primary channel's
//! deviation from the target and drives the indicator. The indicator is
//! only written when the class changes; a failed write leaves the last
//! emitted class untouched so the next tick retries it.

use crate::config::SamplingConfig;
use crate::state::{Channel, SharedTelemetryState};
use crate::traits::{IndicatorError, IndicatorOutput};

use super::ProximityClass;

/// Debounced proximity classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityClassifier {
    last_emitted: Option<ProximityClass>,
}

impl ProximityClassifier {
    pub const fn new() -> Self {
        Self { last_emitted: None }
    }

    /// Class most recently written to the indicator
    pub fn last_emitted(&self) -> Option<ProximityClass> {
        self.last_emitted
    }

    /// Compute the class for the current state
    pub fn classify(state: &SharedTelemetryState) -> ProximityClass {
        let target = state.target();
        if !target.active || !state.primary_ready() {
            return ProximityClass::Off;
        }
        let diff = libm::fabsf(state.relative_angle(Channel::Primary) - target.angle_deg);
        ProximityClass::from_diff(diff)
    }

    /// Run one tick
    ///
    /// Returns the class written to the indicator, or `None` when it was
    /// unchanged.
    pub async fn tick<I: IndicatorOutput>(
        &mut self,
        state: &SharedTelemetryState,
        indicator: &mut I,
    ) -> Result<Option<ProximityClass>, IndicatorError> {
        let class = Self::classify(state);
        if self.last_emitted == Some(class) {
            return Ok(None);
        }

        indicator.show(class).await?;
        self.last_emitted = Some(class);
        Ok(Some(class))
    }

    /// Delay before the next tick (ms)
    pub fn next_tick_ms(&self, sampling: &SamplingConfig) -> u32 {
        match self.last_emitted {
            Some(class) if class.is_tracking() => sampling.classifier_period_ms,
            _ => sampling.classifier_idle_period_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use heapless::Vec;

    #[derive(Default)]
    struct RecordingIndicator {
        shown: Vec<ProximityClass, 16>,
        fail: bool,
    }

    impl IndicatorOutput for RecordingIndicator {
        async fn show(&mut self, class: ProximityClass) -> Result<(), IndicatorError> {
            if self.fail {
                return Err(IndicatorError::WriteFailed);
            }
            self.shown.push(class).map_err(|_| IndicatorError::WriteFailed)
        }
    }

    fn tracking_state(primary_angle: f32, target: f32) -> SharedTelemetryState {
        let state = SharedTelemetryState::default();
        let primary = state.primary_writer().unwrap();
        primary.write_sample(primary_angle, 0.0);
        primary.set_ready(true);
        state.target_writer().unwrap().publish(target);
        state
    }

    #[test]
    fn test_inactive_target_is_off() {
        let state = SharedTelemetryState::default();
        state.primary_writer().unwrap().set_ready(true);

        assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Off);
    }

    #[test]
    fn test_primary_not_ready_is_off() {
        let state = SharedTelemetryState::default();
        state.target_writer().unwrap().publish(3.0);

        assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Off);
    }

    #[test]
    fn test_classify_uses_relative_angle() {
        let state = tracking_state(12.0, 10.0);
        assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Yellow);

        state
            .calibration_writer()
            .unwrap()
            .write_offsets(Channel::Primary, 2.0, 0.0);
        assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Green);
    }

    #[test]
    fn test_deviation_is_absolute() {
        let state = tracking_state(7.0, 10.0);
        assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Orange);
    }

    #[test]
    fn test_same_class_emitted_once() {
        let state = tracking_state(10.3, 10.0);
        let mut classifier = ProximityClassifier::new();
        let mut indicator = RecordingIndicator::default();

        let first = block_on(classifier.tick(&state, &mut indicator)).unwrap();
        let second = block_on(classifier.tick(&state, &mut indicator)).unwrap();

        assert_eq!(first, Some(ProximityClass::Blue));
        assert_eq!(second, None);
        assert_eq!(indicator.shown.as_slice(), &[ProximityClass::Blue]);
    }

    #[test]
    fn test_transition_emits_new_class() {
        let state = SharedTelemetryState::default();
        let primary = state.primary_writer().unwrap();
        primary.set_ready(true);
        state.target_writer().unwrap().publish(0.0);
        let mut classifier = ProximityClassifier::new();
        let mut indicator = RecordingIndicator::default();

        primary.write_sample(8.0, 0.0);
        block_on(classifier.tick(&state, &mut indicator)).unwrap();
        primary.write_sample(0.05, 0.0);
        block_on(classifier.tick(&state, &mut indicator)).unwrap();

        assert_eq!(
            indicator.shown.as_slice(),
            &[ProximityClass::Red, ProximityClass::Green]
        );
    }

    #[test]
    fn test_failed_write_is_retried() {
        let state = tracking_state(11.5, 10.0);
        let mut classifier = ProximityClassifier::new();
        let mut indicator = RecordingIndicator {
            fail: true,
            ..Default::default()
        };

        let result = block_on(classifier.tick(&state, &mut indicator));
        assert_eq!(result, Err(IndicatorError::WriteFailed));
        assert_eq!(classifier.last_emitted(), None);

        indicator.fail = false;
        let result = block_on(classifier.tick(&state, &mut indicator));
        assert_eq!(result, Ok(Some(ProximityClass::Yellow)));
        assert_eq!(classifier.last_emitted(), Some(ProximityClass::Yellow));
    }

    #[test]
    fn test_tick_period_follows_tracking() {
        let sampling = SamplingConfig::default();
        let mut classifier = ProximityClassifier::new();
        let mut indicator = RecordingIndicator::default();
        assert_eq!(classifier.next_tick_ms(&sampling), 100);

        let state = SharedTelemetryState::default();
        block_on(classifier.tick(&state, &mut indicator)).unwrap();
        assert_eq!(classifier.next_tick_ms(&sampling), 100);

        let state = tracking_state(1.0, 1.0);
        block_on(classifier.tick(&state, &mut indicator)).unwrap();
        assert_eq!(classifier.next_tick_ms(&sampling), 50);
    }
}
