use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{mcp3008_decode, mcp3008_request};

/// MCP3008 10-bit ADC on the Pi SPI bus, single-ended on one channel.
pub struct Mcp3008 {
    spi: Spi,
    request: [u8; 3],
}

impl Mcp3008 {
    pub fn new(bus: u8, slave_select: u8, clock_hz: u32, channel: u8) -> Result<Self> {
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::Spi(format!("unsupported spi bus {other}"))),
        };
        let ss = match slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(HwError::Spi(format!("unsupported slave select {other}"))),
        };
        let request = mcp3008_request(channel)?;
        let spi = Spi::new(bus, ss, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(format!("open mcp3008: {e}")))?;
        Ok(Self { spi, request })
    }

    /// One conversion. The chip answers within the same transfer, so this never waits.
    pub fn read(&mut self) -> Result<i32> {
        let mut rx = [0u8; 3];
        let n = self
            .spi
            .transfer(&mut rx, &self.request)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        if n < rx.len() {
            return Err(HwError::ShortTransfer(n));
        }
        let value = mcp3008_decode(rx);
        trace!(raw = value, "mcp3008 read");
        Ok(value)
    }
}
