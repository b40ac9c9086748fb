use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// This enum serves as the single source of truth for asset identity across all pallets,
/// enabling type-safe interactions between the fee abstraction engine, the exchange, and
/// the cap-table registry.
///
/// - `Native`: The chain's fee-paying token (managed by pallet-balances).
/// - `Local(u32)`: Issued tokens (managed by pallet-assets). Equity share classes live in
///   the `0x1...` id namespace; whether an id actually represents a registered equity is
///   decided by the cap-table registry, not by the id alone.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Issued token managed by pallet-assets
  Local(u32),
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    AssetKind::Local(asset_id)
  }
}

// Bitmask Architecture for Asset Classification
//
// 32-bit ID Structure:
// [ 4 bits: Type ] [ 28 bits: Index/ID ]
//
// Types:
// 0x0... -> Native (Reserved, though AssetKind::Native is usually used)
// 0x1... -> Equity share classes (ACME, GLOBEX, etc.)
// 0x2... -> Stablecoins and other non-equity issued tokens

pub const MASK_TYPE: u32 = 0xF000_0000;
pub const MASK_INDEX: u32 = 0x0FFF_FFFF;

pub const TYPE_EQUITY: u32 = 0x1000_0000;
pub const TYPE_STABLE: u32 = 0x2000_0000;

/// Helper trait to inspect AssetKind properties
pub trait AssetInspector {
  fn is_native(&self) -> bool;
  fn local_id(&self) -> Option<u32>;

  // Bitmask checks
  fn in_equity_namespace(&self) -> bool;
  fn in_stable_namespace(&self) -> bool;
}

impl AssetInspector for AssetKind {
  fn is_native(&self) -> bool {
    matches!(self, AssetKind::Native)
  }

  fn local_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) => Some(*id),
      _ => None,
    }
  }

  fn in_equity_namespace(&self) -> bool {
    match self {
      AssetKind::Local(id) => (id & MASK_TYPE) == TYPE_EQUITY,
      _ => false,
    }
  }

  fn in_stable_namespace(&self) -> bool {
    match self {
      AssetKind::Local(id) => (id & MASK_TYPE) == TYPE_STABLE,
      _ => false,
    }
  }
}

/// Helper to construct compile-time IDs
const fn make_id(type_mask: u32, index: u32) -> u32 {
  type_mask | (index & MASK_INDEX)
}

/// Well-known asset constants serving as system defaults
pub mod well_known {
  use super::*;

  // Equity share classes (0x1...)
  pub const ACME: u32 = make_id(TYPE_EQUITY, 1);
  pub const GLOBEX: u32 = make_id(TYPE_EQUITY, 2);
  pub const INITECH: u32 = make_id(TYPE_EQUITY, 3);
  pub const HOOLI: u32 = make_id(TYPE_EQUITY, 4);

  // Stablecoins (0x2...)
  pub const USDQ: u32 = make_id(TYPE_STABLE, 1);
}

/// Metadata container for issued tokens
#[derive(Encode, Decode, DecodeWithMemTracking, Eq, PartialEq, Clone, Debug, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
pub struct CurrencyMetadata {
  pub name: Vec<u8>,
  pub symbol: Vec<u8>,
  pub decimals: u8,
}

/// Helper to resolve metadata for well-known assets (off-chain / view logic)
pub fn get_well_known_metadata(asset: AssetKind) -> Option<CurrencyMetadata> {
  match asset {
    AssetKind::Native => Some(CurrencyMetadata {
      name: b"Native Token".to_vec(),
      symbol: b"NATIVE".to_vec(),
      decimals: 12,
    }),
    AssetKind::Local(id) => match id {
      well_known::ACME => Some(CurrencyMetadata {
        name: b"Acme Corp Common".to_vec(),
        symbol: b"ACME".to_vec(),
        decimals: 0,
      }),
      well_known::GLOBEX => Some(CurrencyMetadata {
        name: b"Globex Corporation Common".to_vec(),
        symbol: b"GLOBEX".to_vec(),
        decimals: 0,
      }),
      well_known::INITECH => Some(CurrencyMetadata {
        name: b"Initech Preferred A".to_vec(),
        symbol: b"INITECH".to_vec(),
        decimals: 0,
      }),
      well_known::HOOLI => Some(CurrencyMetadata {
        name: b"Hooli Class B".to_vec(),
        symbol: b"HOOLI".to_vec(),
        decimals: 0,
      }),
      well_known::USDQ => Some(CurrencyMetadata {
        name: b"Quantum Dollar".to_vec(),
        symbol: b"USDQ".to_vec(),
        decimals: 6,
      }),
      _ => None,
    },
  }
}
