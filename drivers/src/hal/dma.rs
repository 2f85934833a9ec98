//! DMA Hardware Abstraction Layer.
//!
//! A pass-through surface: drivers forward straight to hardware and add no
//! invariants of their own.

use core::fmt;

/// Transfer direction of a channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DmaDirection {
    MemoryToMemory,
    MemoryToPeripheral,
    PeripheralToMemory,
}

/// Per-channel transfer description.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DmaChannelConfig {
    pub direction: DmaDirection,
    pub source: usize,
    pub destination: usize,
    /// Transfer length in bytes.
    pub length: usize,
    /// Raise an interrupt on completion.
    pub interrupt: bool,
}

/// DMA errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DmaError {
    /// Channel index beyond what the controller implements.
    InvalidChannel(usize),
    /// Channel is still running a transfer.
    Busy(usize),
}

impl fmt::Display for DmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmaError::InvalidChannel(chan) => write!(f, "no DMA channel {chan}"),
            DmaError::Busy(chan) => write!(f, "DMA channel {chan} is busy"),
        }
    }
}

/// DMA controller capability table.
pub trait DmaController: Sync {
    /// Program a channel without starting it.
    fn init(&self, channel: usize, config: &DmaChannelConfig);

    /// Program and start a channel.
    fn enable(&self, channel: usize, config: &DmaChannelConfig) -> Result<(), DmaError>;

    fn disable(&self, channel: usize) -> Result<(), DmaError>;

    fn channel_active(&self, channel: usize) -> bool;

    /// Set up descriptor queues for scatter-gather transfers.
    fn setup_job_queues(&self, config: &DmaChannelConfig);
}
