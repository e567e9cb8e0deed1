// Playback speed
// Speed 1..=100 mapped to the delay between ticks

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 100;

/// Shortest and longest delay the mapping can yield, in milliseconds
const MIN_DELAY_MS: i64 = 10;
const MAX_DELAY_MS: i64 = 991;

/// Playback speed, always within `MIN_SPEED..=MAX_SPEED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Speed(u8);

impl Speed {
    /// Clamp any integer into the valid range
    pub fn new(value: i64) -> Self {
        Speed(value.clamp(MIN_SPEED as i64, MAX_SPEED as i64) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Delay before the next tick at this speed
    pub fn delay(&self) -> Duration {
        delay(self.0 as i64)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed(50)
    }
}

impl From<i64> for Speed {
    fn from(value: i64) -> Self {
        Speed::new(value)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

/// `clamp(1000 - 9 * speed, 10, 991)` milliseconds
pub fn delay(speed: i64) -> Duration {
    let ms = 1000_i64.saturating_sub(speed.saturating_mul(9));
    Duration::from_millis(ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_mapping() {
        assert_eq!(delay(1), Duration::from_millis(991));
        assert_eq!(delay(50), Duration::from_millis(550));
        assert_eq!(delay(100), Duration::from_millis(100));
    }

    #[test]
    fn test_delay_clamps_outside_range() {
        assert_eq!(delay(0), Duration::from_millis(991));
        assert_eq!(delay(500), Duration::from_millis(10));
    }

    #[test]
    fn test_speed_clamps() {
        assert_eq!(Speed::new(0).get(), 1);
        assert_eq!(Speed::new(250).get(), 100);
        assert_eq!(Speed::new(-3).get(), 1);
        assert_eq!(Speed::default().delay(), Duration::from_millis(550));
    }

    #[test]
    fn test_speed_deserializes_clamped() {
        let speed: Speed = serde_json::from_str("400").unwrap();
        assert_eq!(speed.get(), 100);
        assert_eq!(serde_json::to_string(&Speed::new(7)).unwrap(), "7");
    }
}
