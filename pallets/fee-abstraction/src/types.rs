use polkadot_sdk::frame_support::pallet_prelude::*;
use scale_info::prelude::vec::Vec;

// Re-export AssetKind from primitives as the single source of truth
pub use primitives::AssetKind;

/// Exchange market view for an equity/native pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Market<Balance> {
  /// Whether the market is open for trading at all
  pub active: bool,
  /// Whether trading is temporarily halted (circuit breaker, auction, etc.)
  pub trading_halted: bool,
  /// Last traded price in native base units per equity unit, precision-scaled
  pub last_price: Balance,
}

/// Cap-table view of a registered equity token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquityInfo<Balance> {
  /// Issuer identifier in the cap-table registry
  pub issuer_id: u32,
  /// Whether the share class is active (not delisted or frozen)
  pub active: bool,
  /// Total issued supply
  pub total_supply: Balance,
}

/// One liquidation candidate in a payer's portfolio.
///
/// Computed per call and discarded; never persisted. Entries only exist for
/// holdings whose market passed the active/halted/priced checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleEquity<Balance> {
  pub asset: AssetKind,
  /// The payer's balance of the equity token
  pub balance: Balance,
  /// Precision-scaled price used for valuation
  pub price: Balance,
  /// Truncated native value of the whole holding at `price`
  pub native_value: Balance,
}

/// Outcome of equity selection: what to sell, and how much
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquitySelection<Balance> {
  pub asset: AssetKind,
  /// Equity quantity to liquidate, slippage buffer included, capped at the balance
  pub quantity: Balance,
  /// Naive expected proceeds at the quoted price, before slippage
  pub expected_native: Balance,
}

/// Exchange collaborator interface.
///
/// The order-matching engine itself is out of scope; any implementation
/// providing market state, spot prices, and swap execution is substitutable.
pub trait ExchangeApi<AccountId, Balance> {
  /// Market state for a base/quote pair
  fn market(base: AssetKind, quote: AssetKind) -> Option<Market<Balance>>;

  /// Current precision-scaled price of an asset in native base units
  fn market_price(asset: AssetKind) -> Option<Balance>;

  /// Swap `amount_in` of `from` into `to` on behalf of `trader`, crediting the
  /// proceeds to `trader`. Implementations are expected to honor
  /// `min_received`, but callers must not rely on it.
  fn execute_swap(
    trader: &AccountId,
    from: AssetKind,
    amount_in: Balance,
    to: AssetKind,
    min_received: Balance,
  ) -> Result<Balance, DispatchError>;
}

/// Cap-table registry collaborator interface
pub trait EquityRegistryApi<Balance> {
  /// Whether the asset is a registered equity token
  fn is_equity_token(asset: AssetKind) -> bool;

  /// Registry entry for a registered equity token
  fn equity_info(asset: AssetKind) -> Option<EquityInfo<Balance>>;

  /// All registered equity tokens, in registry order
  fn equity_tokens() -> Vec<AssetKind>;
}
