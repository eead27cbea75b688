#![cfg_attr(not(test), no_std)]

pub mod pxi;

pub use ctr_config as config;
pub use self::pxi::{FifoError, Pxi, SharedPxi};
