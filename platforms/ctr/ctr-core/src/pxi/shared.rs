use core::{cell::RefCell, ptr::NonNull};

use critical_section::Mutex;

use super::Pxi;

/// A [`Pxi`] that can live in a `static` and be reached from both thread
/// and interrupt context.
///
/// `Pxi` itself does no locking: its mutators take `&mut self`, and two
/// contexts racing a read-modify-write of `PXI_CNT` lose updates. Routing
/// every access through a `SharedPxi` serializes them with a critical
/// section.
///
/// ```rust,ignore
/// static PXI: SharedPxi = SharedPxi::new();
///
/// fn pxi_recv_irq() {
///     PXI.with(|pxi| while let Ok(word) = pxi.pop() { /* ... */ });
/// }
/// ```
pub struct SharedPxi {
    pxi: Mutex<RefCell<Option<Pxi>>>,
}

impl SharedPxi {
    /// An empty slot. Nothing can be done with it until a driver is
    /// [installed](Self::install).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pxi: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install `pxi`, returning whichever driver was installed before.
    ///
    /// All later calls to [`with`](Self::with) reach the new register block.
    pub fn install(&self, pxi: Pxi) -> Option<Pxi> {
        let base = pxi.base();
        let prev = critical_section::with(|cs| self.pxi.borrow_ref_mut(cs).replace(pxi));
        tracing::debug!(?base, replaced = prev.is_some(), "installed shared PXI");
        prev
    }

    /// Remove the installed driver, if there is one.
    pub fn take(&self) -> Option<Pxi> {
        critical_section::with(|cs| self.pxi.borrow_ref_mut(cs).take())
    }

    /// Base of the installed driver's register block, or `None` if nothing
    /// has been installed yet.
    #[must_use]
    pub fn base(&self) -> Option<NonNull<u32>> {
        critical_section::with(|cs| self.pxi.borrow_ref(cs).as_ref().map(Pxi::base))
    }

    /// Run `f` against the installed driver inside a critical section.
    ///
    /// Returns `None` without calling `f` if no driver is installed.
    ///
    /// # Panics
    ///
    /// If called re-entrantly from within `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut Pxi) -> R) -> Option<R> {
        critical_section::with(|cs| self.pxi.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl Default for SharedPxi {
    fn default() -> Self {
        Self::new()
    }
}
