//! PXI register layout.
//!
//! Each side of the PXI sees a block of four 32-bit words. The only word
//! with internal structure is `PXI_CNT`, modeled here as the [`Cnt`]
//! bitfield.
// Unusual groupings are used in binary literals in this file in order to
// separate the bits by which field they represent, rather than by their byte.
#![allow(clippy::unusual_byte_groupings)]

use mycelium_bitfield::bitfield;

/// The four words of a PXI register block, in address order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Reg {
    /// `PXI_SYNC`: inter-core signaling. Passed through untouched.
    Sync = 0,
    /// `PXI_CNT`: FIFO status and control, see [`Cnt`].
    Cnt = 1,
    /// `PXI_SEND`: write port of the outbound FIFO.
    Send = 2,
    /// `PXI_RECV`: read port of the inbound FIFO.
    Recv = 3,
}

impl Reg {
    /// Number of words in a register block.
    pub const COUNT: usize = 4;

    /// Word index of this register relative to the block base.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Byte offset of this register relative to the block base.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.index() * core::mem::size_of::<u32>()
    }
}

bitfield! {
    /// Register `PXI_CNT` (offset `0x0004`)
    ///
    /// Only the low half-word is defined by the hardware; the upper bits are
    /// carried through unchanged by every read-modify-write.
    #[derive(PartialEq, Eq)]
    pub struct Cnt<u32> {
        /// Send FIFO empty. Read-only.
        pub const SEND_EMPTY: bool;
        /// Send FIFO full. Read-only.
        pub const SEND_FULL: bool;
        /// Raise an IRQ when the send FIFO drains to empty.
        pub const SEND_EMPTY_IRQ: bool;
        /// Flush the send FIFO. Write-only; writing `0` has no effect.
        pub const SEND_CLEAR: bool;

        const _RESERVED_0 = 4;

        /// Receive FIFO empty. Read-only.
        pub const RECV_EMPTY: bool;
        /// Receive FIFO full. Read-only.
        pub const RECV_FULL: bool;
        /// Raise an IRQ when the receive FIFO becomes non-empty.
        pub const RECV_NOT_EMPTY_IRQ: bool;

        const _RESERVED_1 = 3;

        /// Error latch on read, acknowledge on write.
        ///
        /// > Set when the receive FIFO is read while empty, or the send FIFO
        /// > is written while full. Not set while the FIFOs are disabled.
        ///
        /// Writing `1` is the acknowledge pulse. What exactly the
        /// acknowledge clears has not been confirmed on hardware.
        pub const ERROR_ACK: bool;
        /// Enable the send and receive FIFOs.
        pub const ENABLE: bool;
    }
}
