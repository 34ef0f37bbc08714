//! Pure helpers for the ADC wire format and servo pulse timing.
//! Kept free of GPIO types so they can be tested on any host.

use crate::error::{HwError, Result};

/// Highest valid MCP3008 single-ended channel.
pub const MCP3008_MAX_CHANNEL: u8 = 7;

/// Standard hobby-servo frame period.
pub const SERVO_PERIOD_US: u64 = 20_000;

/// Build the 3-byte MCP3008 single-ended conversion request for `channel`.
pub fn mcp3008_request(channel: u8) -> Result<[u8; 3]> {
    if channel > MCP3008_MAX_CHANNEL {
        return Err(HwError::InvalidChannel(channel));
    }
    // start bit, then SGL=1 + 3 channel bits in the high nibble
    Ok([0x01, (0x08 | channel) << 4, 0x00])
}

/// Decode the 10-bit conversion result from the MCP3008 response frame.
#[inline]
pub fn mcp3008_decode(rx: [u8; 3]) -> i32 {
    (i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2])
}

/// Map a servo angle (degrees, clamped to 0..=180) to a pulse width in microseconds.
///
/// Linear between `min_us` (0 deg) and `max_us` (180 deg), integer arithmetic.
pub fn angle_to_pulse_us(angle: i32, min_us: u64, max_us: u64) -> u64 {
    let a = u64::try_from(angle.clamp(0, 180)).unwrap_or(0);
    let span = max_us.saturating_sub(min_us);
    min_us + span * a / 180
}
