use crate::clip::Timestamp;

pub trait ClockPort: Send + Sync {
    fn now(&self) -> Timestamp;
}
