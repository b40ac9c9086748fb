//! Ecosystem Constants for the Equitum Chain
//!
//! This module centralizes all system-level constants, including pallet IDs for
//! module-owned accounts and the fundamental economic parameters of the fee
//! abstraction engine.
//!
//! These constants are the single source of truth for system architecture and are re-used
//! across all runtime configurations via the primitives crate.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// Fee Abstraction pallet ID; its derived account holds the treasury pool
  pub const FEE_ABSTRACTION_PALLET_ID: &[u8; 8] = b"eqfeeabs";

  /// Fee collector ID; its derived account receives all native transaction fees
  pub const FEE_COLLECTOR_PALLET_ID: &[u8; 8] = b"eqfeecol";

  /// Exchange pallet ID (order-matching engine)
  pub const EXCHANGE_PALLET_ID: &[u8; 8] = b"eqexchng";

  /// Equity registry pallet ID (cap-table registry)
  pub const EQUITY_REGISTRY_PALLET_ID: &[u8; 8] = b"eqcaptbl";
}

/// Ecosystem parameters defining mathematical constants and default thresholds.
///
/// Runtime-tunable economics start from these defaults and are adjusted by
/// governance through the fee abstraction pallet's parameter store.
pub mod params {
  use super::Balance;

  /// Precision scalar for all price calculations (10^12).
  ///
  /// Exchange prices are expressed in native base units per whole equity unit,
  /// scaled by this constant.
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Denominator for basis-point fractions (1 bps = 1/10_000).
  pub const BPS_DENOMINATOR: u32 = 10_000;

  /// Default fee markup charged on abstracted fees (0.5%).
  ///
  /// The markup compensates the protocol for the forced liquidation service and
  /// discourages routine use of the abstraction path over plain fee payment.
  pub const DEFAULT_FEE_MARKUP_BPS: u32 = 50;

  /// Default maximum tolerated slippage on liquidation swaps (5%).
  pub const DEFAULT_MAX_SLIPPAGE_BPS: u32 = 500;

  /// Default minimum native value an equity holding must reach to be
  /// considered for liquidation (1.0 in base units).
  ///
  /// Dust holdings below this threshold are never swapped.
  pub const DEFAULT_MIN_EQUITY_VALUE: Balance = PRECISION;

  /// Default per-block ceiling on total abstracted fee volume (10,000 units).
  ///
  /// DoS-protection cap: once the cumulative fee-plus-markup volume of a block
  /// reaches this ceiling, further abstraction requests fail until the next block.
  pub const DEFAULT_MAX_FEE_ABSTRACTION_PER_BLOCK: Balance = 10_000 * PRECISION;

  /// Default minimum treasury deposit (1.0 in base units).
  pub const DEFAULT_TREASURY_FUNDING_MINIMUM: Balance = PRECISION;

  /// Maximum number of entries in the enabled-equity whitelist and in a
  /// grant's allowed-equity list.
  pub const MAX_ENABLED_EQUITIES: u32 = 32;
}
