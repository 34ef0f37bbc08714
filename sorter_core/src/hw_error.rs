//! Maps `Box<dyn Error>` from trait boundaries to typed `SorterError`.
//!
//! The traits in `sorter_traits` use boxed errors so any backend fits; this
//! module turns them into our enum, with a feature-gated path that downcasts
//! `sorter_hardware::HwError` precisely.

use crate::error::SorterError;

/// Map a trait-boundary error to a typed `SorterError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SorterError {
    #[cfg(feature = "hardware-errors")]
    {
        use sorter_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::InvalidChannel(_) => SorterError::Config(hw.to_string()),
                HwError::Io(io) => SorterError::Io(io.to_string()),
                other => SorterError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return SorterError::Io(io.to_string());
    }
    SorterError::Hardware(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_kind() {
        let e = std::io::Error::other("bus gone");
        assert!(matches!(map_hw_error(&e), SorterError::Io(m) if m.contains("bus gone")));
    }

    #[test]
    fn foreign_errors_become_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "servo stalled".into();
        assert!(matches!(map_hw_error(&*e), SorterError::Hardware(m) if m == "servo stalled"));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_errors_are_downcast() {
        use sorter_hardware::error::HwError;
        let e = HwError::Spi("no device".into());
        assert!(matches!(map_hw_error(&e), SorterError::HardwareFault(_)));
        let e = HwError::InvalidChannel(9);
        assert!(matches!(map_hw_error(&e), SorterError::Config(_)));
    }
}
