// ============================================================================
// PARAMETER STORE — the two Canny thresholds and their ordering invariant
// ============================================================================

use super::{Publisher, Trigger};

pub const THRESHOLD_MIN: u8 = 0;
pub const THRESHOLD_MAX: u8 = 255;
pub const DEFAULT_LOW: u8 = 75;
pub const DEFAULT_HIGH: u8 = 200;

/// Low/high hysteresis thresholds.  Always `low < high`; the `u8` type
/// covers the `[0, 255]` bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdParams {
    low: u8,
    high: u8,
}

impl ThresholdParams {
    /// Build a legal pair from arbitrary input.  `high` is clamped to
    /// `[1, 255]` first, then `low` to `[0, high - 1]`.
    pub fn clamped(low: i32, high: i32) -> Self {
        let high = high.clamp(THRESHOLD_MIN as i32 + 1, THRESHOLD_MAX as i32) as u8;
        let low = low.clamp(THRESHOLD_MIN as i32, high as i32 - 1) as u8;
        Self { low, high }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    /// Inclusive range the low slider may take given the current high.
    pub fn low_range(&self) -> std::ops::RangeInclusive<u8> {
        THRESHOLD_MIN..=self.high - 1
    }

    /// Inclusive range the high slider may take given the current low.
    pub fn high_range(&self) -> std::ops::RangeInclusive<u8> {
        self.low + 1..=THRESHOLD_MAX
    }
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

/// Holds the thresholds and publishes [`Trigger::ParamsChanged`] on every
/// committed set.
///
/// Setters take `i32` so out-of-range slider or CLI input is clamped rather
/// than rejected; clamping is silent and always leaves `low < high`.
#[derive(Default)]
pub struct ParameterStore {
    params: ThresholdParams,
    publisher: Publisher,
}

impl ParameterStore {
    pub fn new(initial: ThresholdParams) -> Self {
        Self {
            params: initial,
            publisher: Publisher::default(),
        }
    }

    pub fn params(&self) -> ThresholdParams {
        self.params
    }

    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<Trigger> {
        self.publisher.subscribe()
    }

    /// Clamp `v` into `[0, high - 1]` and commit it.  Returns the committed value.
    pub fn set_low(&mut self, v: i32) -> u8 {
        let high = self.params.high as i32;
        self.params.low = v.clamp(THRESHOLD_MIN as i32, high - 1) as u8;
        self.publisher.publish(Trigger::ParamsChanged);
        self.params.low
    }

    /// Clamp `v` into `[low + 1, 255]` and commit it.  Returns the committed value.
    pub fn set_high(&mut self, v: i32) -> u8 {
        let low = self.params.low as i32;
        self.params.high = v.clamp(low + 1, THRESHOLD_MAX as i32) as u8;
        self.publisher.publish(Trigger::ParamsChanged);
        self.params.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_legal(p: ThresholdParams) {
        assert!(p.low() < p.high(), "low {} must stay below high {}", p.low(), p.high());
    }

    #[test]
    fn set_low_clamps_below_high() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set_low(250), 199);
        assert_eq!(store.params().low(), 199);
        assert_eq!(store.params().high(), 200);
    }

    #[test]
    fn set_high_clamps_above_low() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set_high(10), 76);
        assert_eq!(store.set_high(1000), 255);
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set_low(-40), 0);
    }

    #[test]
    fn invariant_holds_for_every_call_in_a_long_sequence() {
        let mut store = ParameterStore::default();
        // Deterministic pseudo-random walk over a wide input range.
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..5_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let v = (seed % 700) as i32 - 200;
            if seed & 1 == 0 {
                store.set_low(v);
            } else {
                store.set_high(v);
            }
            assert_legal(store.params());
        }
    }

    #[test]
    fn clamped_constructor_repairs_inverted_pair() {
        let p = ThresholdParams::clamped(200, 100);
        assert_eq!((p.low(), p.high()), (99, 100));
        let p = ThresholdParams::clamped(0, 0);
        assert_eq!((p.low(), p.high()), (0, 1));
    }

    #[test]
    fn every_set_publishes_a_trigger() {
        let mut store = ParameterStore::default();
        let rx = store.subscribe();
        store.set_low(10);
        store.set_high(300);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn slider_ranges_follow_the_other_value() {
        let p = ThresholdParams::clamped(75, 200);
        assert_eq!(p.low_range(), 0..=199);
        assert_eq!(p.high_range(), 76..=255);
    }
}
