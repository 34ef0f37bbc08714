//! Capability traits shared by the sorter crates.
//!
//! Hardware backends implement these; the core only ever talks to them.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Boxed error used at the trait boundary so backends can surface their own types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Analog sampling source.
///
/// `read` is non-blocking and returns the latest magnitude (nominally
/// 0..=1023 for a 10-bit ADC).
pub trait Sensor {
    fn read(&mut self) -> Result<i32, BoxError>;
}

/// Positional actuator (sorting flap servo). Fire-and-forget.
pub trait Actuator {
    fn move_to(&mut self, position: i32) -> Result<(), BoxError>;
}

impl<T: Sensor + ?Sized> Sensor for Box<T> {
    fn read(&mut self) -> Result<i32, BoxError> {
        (**self).read()
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn move_to(&mut self, position: i32) -> Result<(), BoxError> {
        (**self).move_to(position)
    }
}
