//! An in-memory stand-in for a PXI register block.
//!
//! [`SimBlock`] is plain memory: it has no FIFOs behind it and none of the
//! hardware's side effects. Writing `SEND` does not set `SEND_FULL`, reading
//! `RECV` does not drain anything, and the error latch only changes when
//! someone writes it. Tests drive the status bits by hand.

use core::{cell::UnsafeCell, ptr::NonNull};

use super::regs::{Cnt, Reg};

#[repr(C, align(4))]
pub struct SimBlock {
    words: [UnsafeCell<u32>; Reg::COUNT],
}

impl Default for SimBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBlock {
    /// A block with every register zeroed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: [
                UnsafeCell::new(0),
                UnsafeCell::new(0),
                UnsafeCell::new(0),
                UnsafeCell::new(0),
            ],
        }
    }

    /// A zeroed block whose `PXI_CNT` starts out as `cnt`.
    #[must_use]
    pub fn with_cnt(cnt: Cnt) -> Self {
        let block = Self::new();
        block.set_cnt(cnt);
        block
    }

    /// Base pointer to hand to [`Pxi::new`](super::Pxi::new).
    ///
    /// The pointer covers all four words and stays valid for as long as
    /// `self` does not move.
    #[must_use]
    pub fn base(&self) -> NonNull<u32> {
        NonNull::from(&self.words).cast()
    }

    pub fn read(&self, reg: Reg) -> u32 {
        // Safety: the cell is only ever accessed by volatile word-sized reads
        // and writes, here or through a `Pxi` pointed at `base()`.
        unsafe { self.words[reg.index()].get().read_volatile() }
    }

    pub fn write(&self, reg: Reg, value: u32) {
        // Safety: see `read`.
        unsafe { self.words[reg.index()].get().write_volatile(value) }
    }

    pub fn cnt(&self) -> Cnt {
        Cnt::from_bits(self.read(Reg::Cnt))
    }

    pub fn set_cnt(&self, cnt: Cnt) {
        self.write(Reg::Cnt, cnt.bits())
    }
}
