use std::time::{SystemTime, UNIX_EPOCH};

use cs_core::ports::ClockPort;
use cs_core::Timestamp;

pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reports the epoch itself.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Timestamp::from_epoch_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_a_time_after_2018() {
        assert!(SystemClock.now().as_secs() > 1_514_764_800);
    }
}
