//! Bring-up configuration for the CTR inter-processor FIFO (PXI).
//!
//! These types are shared between board crates and their build scripts, so
//! they carry no behavior beyond describing what the driver should do at
//! startup.
#![cfg_attr(not(test), no_std)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxiConfiguration {
    /// Which core's register block to drive.
    #[serde(default = "PxiConfiguration::default_mapping")]
    pub mapping: Mapping,
    /// Turn the send/receive FIFOs on once configured.
    #[serde(default = "PxiConfiguration::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub send_empty_irq: bool,
    #[serde(default)]
    pub receive_not_empty_irq: bool,
    /// Flush whatever a previous stage left in the send FIFO.
    #[serde(default)]
    pub flush_on_init: bool,
}

/// The two register blocks of the PXI, one per side of the link.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mapping {
    /// The block seen by the ARM9 (security) core.
    Arm9,
    /// The block seen by the ARM11 (application) cores.
    Arm11,
}

impl PxiConfiguration {
    const fn default_mapping() -> Mapping {
        Mapping::Arm11
    }

    const fn default_enabled() -> bool {
        true
    }
}

impl Default for PxiConfiguration {
    fn default() -> Self {
        Self {
            mapping: Self::default_mapping(),
            enabled: Self::default_enabled(),
            send_empty_irq: false,
            receive_not_empty_irq: false,
            flush_on_init: false,
        }
    }
}

impl Mapping {
    pub const ARM9_BASE: usize = 0x1000_8000;
    pub const ARM11_BASE: usize = 0x1016_3000;

    /// Physical address of this side's `PXI_SYNC` register.
    #[must_use]
    pub const fn base_addr(self) -> usize {
        match self {
            Mapping::Arm9 => Self::ARM9_BASE,
            Mapping::Arm11 => Self::ARM11_BASE,
        }
    }
}
