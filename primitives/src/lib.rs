//! Shared primitive types for the Equitum chain: asset identity, balance
//! aliases, pallet IDs, and the default economic parameters of the fee
//! abstraction engine.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod assets;
pub mod ecosystem;

pub use assets::*;
pub use ecosystem::*;
