//! PXI: the pair of hardware FIFOs linking the ARM9 and ARM11 cores.
//!
//! Each core owns one register block. Words written to `PXI_SEND` on one side
//! come out of `PXI_RECV` on the other, in order, and `PXI_CNT` reports how
//! full the two queues are. There is no buffering in software: every query
//! is a fresh read of the hardware, and [`Pxi::push`] / [`Pxi::pop`] either
//! move exactly one word or return an error immediately.
//!
//! # Concurrency
//!
//! [`Pxi`] does not lock anything. Every method that writes a register takes
//! `&mut self`, so within one context the borrow checker keeps
//! read-modify-write sequences on `PXI_CNT` from interleaving. When the same
//! block is also touched from an interrupt handler, share it through
//! [`SharedPxi`] (or mask the PXI interrupts around the access) so the two
//! contexts cannot lose each other's updates.
use core::{fmt, ptr::NonNull};

use ctr_config::{Mapping, PxiConfiguration};

pub mod regs;
mod shared;
pub mod sim;

pub use self::regs::{Cnt, Reg};
pub use self::shared::SharedPxi;

/// Handle to one side's PXI register block.
///
/// The handle does not own the registers; it only remembers where they are.
pub struct Pxi {
    base: NonNull<u32>,
}

/// Errors returned by [`Pxi::push`] and [`Pxi::pop`].
///
/// Both are recoverable: nothing was transferred, and the caller may retry,
/// wait for the matching IRQ, or give up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FifoError {
    /// The send FIFO was full; `PXI_SEND` was not written.
    SendFull,
    /// The receive FIFO was empty; `PXI_RECV` was not read.
    ReceiveEmpty,
}

// Safety: a `Pxi` is only an address. Moving it to another context is fine;
// concurrent *use* is what needs serializing, and every mutator requires
// `&mut self`.
unsafe impl Send for Pxi {}

impl Pxi {
    /// Create a driver for the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to four consecutive, 4-byte-aligned `u32` PXI
    /// registers (or a [`SimBlock`](sim::SimBlock) standing in for them) that
    /// stay valid for as long as this `Pxi` uses them. No other `Pxi` may be
    /// mutating the same block at the same time.
    #[must_use]
    pub unsafe fn new(base: NonNull<u32>) -> Self {
        Self { base }
    }

    /// Create a driver for one of the two hardware register blocks.
    ///
    /// # Safety
    ///
    /// Must run on the core that `mapping` names, with the PXI's physical
    /// addresses identity-mapped. Care should be taken not to have multiple
    /// instances live at the same time that may race each other.
    #[must_use]
    pub unsafe fn summon(mapping: Mapping) -> Self {
        // Safety: both well-known base addresses are non-zero.
        let base = unsafe { NonNull::new_unchecked(mapping.base_addr() as *mut u32) };
        unsafe { Self::new(base) }
    }

    /// [Summon](Self::summon) the block named by `config` and apply the rest
    /// of the configuration to it.
    ///
    /// # Safety
    ///
    /// The same as [`Pxi::summon`].
    #[must_use]
    pub unsafe fn init(config: &PxiConfiguration) -> Self {
        let mut pxi = unsafe { Self::summon(config.mapping) };
        pxi.configure(config);
        pxi
    }

    /// Point this driver at a different register block, returning the old
    /// base.
    ///
    /// # Safety
    ///
    /// The same as [`Pxi::new`], for `base`.
    pub unsafe fn change_base(&mut self, base: NonNull<u32>) -> NonNull<u32> {
        let prev = core::mem::replace(&mut self.base, base);
        tracing::debug!(?prev, ?base, "PXI base changed");
        prev
    }

    /// The register block this driver currently targets.
    #[inline]
    #[must_use]
    pub fn base(&self) -> NonNull<u32> {
        self.base
    }

    /// Apply a bring-up configuration.
    ///
    /// The send FIFO is flushed first (if asked for), then the IRQ enables
    /// and the FIFO enable are written together in one read-modify-write.
    /// `config.mapping` is not consulted; this driver keeps its current base.
    #[tracing::instrument(
        name = "Pxi::configure",
        level = tracing::Level::DEBUG,
        skip(self)
    )]
    pub fn configure(&mut self, config: &PxiConfiguration) {
        if config.flush_on_init {
            self.fifo_send_clear();
        }
        let cnt = self.modify_cnt(|cnt| {
            cnt.set(Cnt::SEND_EMPTY_IRQ, config.send_empty_irq)
                .set(Cnt::RECV_NOT_EMPTY_IRQ, config.receive_not_empty_irq)
                .set(Cnt::ENABLE, config.enabled);
        });
        tracing::debug!(?cnt, "PXI configured");
    }

    // === PXI_CNT ===

    /// Snapshot of `PXI_CNT`.
    ///
    /// The hardware may change the status bits at any time after this
    /// returns.
    #[inline]
    #[must_use]
    pub fn cnt(&self) -> Cnt {
        Cnt::from_bits(self.read(Reg::Cnt))
    }

    /// Read `PXI_CNT` once, let `f` edit it, and write the result back once.
    /// Returns the value written.
    ///
    /// Every bit `f` leaves alone is written back exactly as it was read.
    /// Note that this includes [`Cnt::ERROR_ACK`]: a latched error reads as
    /// `1`, and writing that `1` back is an acknowledge.
    ///
    /// The read and the write are separate bus accesses. Anything else that
    /// writes `PXI_CNT` in between (an interrupt handler, say) will have its
    /// write lost.
    pub fn modify_cnt(&mut self, f: impl FnOnce(&mut Cnt)) -> Cnt {
        let mut cnt = self.cnt();
        f(&mut cnt);
        self.write(Reg::Cnt, cnt.bits());
        cnt
    }

    #[inline]
    #[must_use]
    pub fn send_empty_status(&self) -> bool {
        self.cnt().get(Cnt::SEND_EMPTY)
    }

    #[inline]
    #[must_use]
    pub fn send_full_status(&self) -> bool {
        self.cnt().get(Cnt::SEND_FULL)
    }

    #[inline]
    #[must_use]
    pub fn receive_empty_status(&self) -> bool {
        self.cnt().get(Cnt::RECV_EMPTY)
    }

    #[inline]
    #[must_use]
    pub fn receive_full_status(&self) -> bool {
        self.cnt().get(Cnt::RECV_FULL)
    }

    /// Is the error latch set?
    ///
    /// The hardware sets it on a read from an empty receive FIFO or a write
    /// to a full send FIFO, but never while the FIFOs are disabled.
    /// [`push`](Self::push) and [`pop`](Self::pop) check the status bits
    /// first and never consult the latch. Only an explicit
    /// [`fifo_ack`](Self::fifo_ack) is meant to clear it, but see
    /// [`modify_cnt`](Self::modify_cnt) for how any CNT write interacts with
    /// a latched error.
    #[inline]
    #[must_use]
    pub fn error(&self) -> bool {
        self.cnt().get(Cnt::ERROR_ACK)
    }

    #[inline]
    #[must_use]
    pub fn send_empty_irq(&self) -> bool {
        self.cnt().get(Cnt::SEND_EMPTY_IRQ)
    }

    pub fn set_send_empty_irq(&mut self, enabled: bool) {
        self.modify_cnt(|cnt| {
            cnt.set(Cnt::SEND_EMPTY_IRQ, enabled);
        });
    }

    #[inline]
    #[must_use]
    pub fn receive_not_empty_irq(&self) -> bool {
        self.cnt().get(Cnt::RECV_NOT_EMPTY_IRQ)
    }

    pub fn set_receive_not_empty_irq(&mut self, enabled: bool) {
        self.modify_cnt(|cnt| {
            cnt.set(Cnt::RECV_NOT_EMPTY_IRQ, enabled);
        });
    }

    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.cnt().get(Cnt::ENABLE)
    }

    /// Enable or disable both FIFOs.
    ///
    /// While disabled the error latch stays quiet. Pushing or popping while
    /// disabled is not something the hardware defines; don't.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.modify_cnt(|cnt| {
            cnt.set(Cnt::ENABLE, enabled);
        });
        tracing::debug!(enabled, "PXI FIFOs toggled");
    }

    /// Flush the send FIFO. The receive FIFO is untouched.
    pub fn fifo_send_clear(&mut self) {
        self.modify_cnt(|cnt| {
            cnt.set(Cnt::SEND_CLEAR, true);
        });
    }

    /// Pulse the acknowledge bit.
    ///
    /// Best effort: the acknowledge is believed to clear the error latch,
    /// but what else (if anything) it resets in the FIFOs has not been
    /// confirmed on hardware. Check [`error`](Self::error) afterwards rather
    /// than assuming it worked.
    pub fn fifo_ack(&mut self) {
        let cnt = self.modify_cnt(|cnt| {
            cnt.set(Cnt::ERROR_ACK, true);
        });
        tracing::trace!(?cnt, "PXI acknowledge");
    }

    // === PXI_SYNC ===

    /// Read `PXI_SYNC`. Its contents are not interpreted here.
    #[inline]
    #[must_use]
    pub fn sync(&self) -> u32 {
        self.read(Reg::Sync)
    }

    /// Write `PXI_SYNC` verbatim.
    #[inline]
    pub fn set_sync(&mut self, value: u32) {
        self.write(Reg::Sync, value)
    }

    // === FIFOs ===

    /// Push one word into the send FIFO.
    ///
    /// If the FIFO reports full, `PXI_SEND` is not touched and
    /// [`FifoError::SendFull`] is returned. Never waits.
    pub fn push(&mut self, data: u32) -> Result<(), FifoError> {
        if self.send_full_status() {
            tracing::trace!(data, "PXI send FIFO full");
            return Err(FifoError::SendFull);
        }
        self.write(Reg::Send, data);
        Ok(())
    }

    /// Pop one word from the receive FIFO.
    ///
    /// If the FIFO reports empty, `PXI_RECV` is not read and
    /// [`FifoError::ReceiveEmpty`] is returned. Never waits.
    pub fn pop(&mut self) -> Result<u32, FifoError> {
        if self.receive_empty_status() {
            tracing::trace!("PXI receive FIFO empty");
            return Err(FifoError::ReceiveEmpty);
        }
        Ok(self.read(Reg::Recv))
    }

    /// Push words from `words` until the send FIFO fills up.
    ///
    /// Returns how many words were accepted; the rest are left for the
    /// caller to retry, e.g. from the send-empty IRQ.
    pub fn push_from(&mut self, words: &[u32]) -> usize {
        let mut sent = 0;
        for &word in words {
            if self.push(word).is_err() {
                break;
            }
            sent += 1;
        }
        sent
    }

    /// Pop words into `buf` until the receive FIFO is empty or `buf` is full.
    ///
    /// Returns how many words were written to the front of `buf`.
    pub fn drain_into(&mut self, buf: &mut [u32]) -> usize {
        let mut received = 0;
        for slot in buf.iter_mut() {
            match self.pop() {
                Ok(word) => *slot = word,
                Err(_) => break,
            }
            received += 1;
        }
        received
    }

    // === raw access ===

    #[inline(always)]
    fn reg_ptr(&self, reg: Reg) -> *mut u32 {
        // Safety: `new`'s contract guarantees four words at `base`, and
        // `Reg::index` is always less than four.
        unsafe { self.base.as_ptr().add(reg.index()) }
    }

    #[inline(always)]
    fn read(&self, reg: Reg) -> u32 {
        // Safety: see `reg_ptr`.
        unsafe { self.reg_ptr(reg).read_volatile() }
    }

    #[inline(always)]
    fn write(&mut self, reg: Reg, value: u32) {
        // Safety: see `reg_ptr`.
        unsafe { self.reg_ptr(reg).write_volatile(value) }
    }
}

impl fmt::Debug for Pxi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pxi")
            .field("base", &self.base)
            .field("cnt", &self.cnt())
            .finish()
    }
}

// === FifoError ===

impl fmt::Display for FifoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FifoError::SendFull => f.write_str("PXI send FIFO is full"),
            FifoError::ReceiveEmpty => f.write_str("PXI receive FIFO is empty"),
        }
    }
}
