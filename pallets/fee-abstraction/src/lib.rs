//! Fee Abstraction Pallet
//!
//! Lets an account pay native transaction fees by liquidating part of its
//! equity-token holdings through the exchange, bounded by slippage limits and
//! a per-block volume cap, with swap remainders absorbed by a
//! governance-controlled treasury.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

#[frame::pallet]
pub mod pallet {
  use super::{WeightInfo, types::*};
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{
      storage::with_storage_layer,
      traits::{
        Time,
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::Preservation,
      },
    },
    sp_core::U256,
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::{AssetInspector, AssetKind, ecosystem::params as defaults};

  /// Configuration trait for the fee abstraction pallet
  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// The assets pallet holding equity-token balances
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// The currency trait for the native token
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Exchange collaborator used for market state, pricing, and swap execution
    type Exchange: ExchangeApi<Self::AccountId, Balance>;

    /// Cap-table registry collaborator deciding what counts as an equity token
    type EquityRegistry: EquityRegistryApi<Balance>;

    /// Origin that can perform governance operations
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// The pallet ID; its derived account holds the treasury pool
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Account receiving the native transaction fees paid through abstraction
    #[pallet::constant]
    type FeeCollector: Get<Self::AccountId>;

    /// Precision scalar for exchange prices
    #[pallet::constant]
    type Precision: Get<Balance>;

    /// Time provider for audit record timestamps
    type TimeProvider: Time;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  pub type Balance = u128;

  /// Timestamp type supplied by the time provider
  pub type MomentOf<T> = <<T as Config>::TimeProvider as Time>::Moment;

  /// Bounded list of equity assets, used for the enabled-equity whitelist and
  /// per-grant equity restrictions
  pub type EquityList = BoundedVec<AssetKind, ConstU32<{ defaults::MAX_ENABLED_EQUITIES }>>;

  /// Governance-owned economic parameters of the engine
  #[derive(
    Clone,
    Encode,
    Decode,
    DecodeWithMemTracking,
    Eq,
    PartialEq,
    RuntimeDebug,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct FeeAbstractionParams {
    /// Master switch; when false every abstraction request fails
    pub enabled: bool,
    /// Surcharge on the raw fee, in basis points
    pub fee_markup_bps: u32,
    /// Tolerated adverse deviation on liquidation swaps, in basis points
    pub max_slippage_bps: u32,
    /// Holdings valued below this are never considered for liquidation
    pub min_equity_value: Balance,
    /// Per-block ceiling on cumulative fee-plus-markup volume
    pub max_fee_abstraction_per_block: Balance,
    /// Minimum accepted treasury deposit
    pub treasury_funding_minimum: Balance,
    /// Equities allowed for liquidation; empty means all registered equities
    pub enabled_equities: EquityList,
  }

  impl Default for FeeAbstractionParams {
    fn default() -> Self {
      Self {
        enabled: false,
        fee_markup_bps: defaults::DEFAULT_FEE_MARKUP_BPS,
        max_slippage_bps: defaults::DEFAULT_MAX_SLIPPAGE_BPS,
        min_equity_value: defaults::DEFAULT_MIN_EQUITY_VALUE,
        max_fee_abstraction_per_block: defaults::DEFAULT_MAX_FEE_ABSTRACTION_PER_BLOCK,
        treasury_funding_minimum: defaults::DEFAULT_TREASURY_FUNDING_MINIMUM,
        enabled_equities: Default::default(),
      }
    }
  }

  /// Height-keyed usage counter for the per-block cap.
  ///
  /// There is no reset hook: a stored height different from the current block
  /// reads as zero, and the next increment rewrites the entry under the
  /// current height.
  #[derive(
    Clone, Copy, Default, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen,
  )]
  pub struct BlockUsageCounter<BlockNumber> {
    pub height: BlockNumber,
    pub used: Balance,
  }

  /// Immutable audit record of one successful fee abstraction
  #[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
  pub struct FeeAbstractionRecord<AccountId, BlockNumber, Moment> {
    pub id: u64,
    pub payer: AccountId,
    pub equity: AssetKind,
    pub equity_swapped: Balance,
    pub native_received: Balance,
    pub gas_fee_paid: Balance,
    pub markup_paid: Balance,
    pub treasury_returned: Balance,
    pub block_height: BlockNumber,
    pub timestamp: Moment,
  }

  /// Governance-issued, expiring, capped fee allowance.
  ///
  /// Independent of the swap path; `used_fee_amount <= allowed_fee_amount` is
  /// enforced at use-time only.
  #[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
  pub struct TreasuryFeeGrant<BlockNumber> {
    pub allowed_fee_amount: Balance,
    pub used_fee_amount: Balance,
    pub expiration_height: BlockNumber,
    pub allowed_equities: EquityList,
    pub granted_at_height: BlockNumber,
    pub granted_by_proposal: u64,
  }

  /// Engine parameters (governance-owned singleton)
  #[pallet::storage]
  #[pallet::getter(fn params)]
  pub type Params<T: Config> = StorageValue<_, FeeAbstractionParams, ValueQuery>;

  /// Abstracted-fee volume of the current block (lazy height-keyed reset)
  #[pallet::storage]
  #[pallet::getter(fn block_usage)]
  pub type BlockUsage<T: Config> =
    StorageValue<_, BlockUsageCounter<BlockNumberFor<T>>, ValueQuery>;

  /// Last issued audit record id; ids are monotonic starting at 1
  #[pallet::storage]
  #[pallet::getter(fn record_counter)]
  pub type RecordCounter<T: Config> = StorageValue<_, u64, ValueQuery>;

  /// Audit records by id, one per successful abstraction, never mutated
  #[pallet::storage]
  #[pallet::getter(fn record)]
  pub type Records<T: Config> = StorageMap<
    _,
    Blake2_128Concat,
    u64,
    FeeAbstractionRecord<T::AccountId, BlockNumberFor<T>, MomentOf<T>>,
    OptionQuery,
  >;

  /// Fee grants by grantee
  #[pallet::storage]
  #[pallet::getter(fn grant)]
  pub type Grants<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, TreasuryFeeGrant<BlockNumberFor<T>>, OptionQuery>;

  /// Account with elevated treasury deposit rights
  #[pallet::storage]
  #[pallet::getter(fn treasury_owner)]
  pub type TreasuryOwner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Accounts permitted to fund the treasury, enumerable by prefix scan
  #[pallet::storage]
  pub type TreasuryWhitelist<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, (), OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A fee was paid by liquidating equity
    FeeAbstracted {
      payer: T::AccountId,
      equity: AssetKind,
      equity_swapped: Balance,
      native_received: Balance,
      gas_fee_paid: Balance,
      markup_paid: Balance,
      treasury_returned: Balance,
      record_id: u64,
    },
    /// Engine parameters updated by governance
    ParamsUpdated {
      enabled: bool,
      fee_markup_bps: u32,
      max_slippage_bps: u32,
    },
    /// Native tokens deposited into the treasury pool
    TreasuryFunded { funder: T::AccountId, amount: Balance },
    /// Native tokens withdrawn from the treasury pool by governance
    TreasuryWithdrawal {
      recipient: T::AccountId,
      amount: Balance,
    },
    /// Treasury owner assigned
    TreasuryOwnerSet { owner: T::AccountId },
    /// Account added to the treasury funding whitelist
    WhitelistedFunderAdded { who: T::AccountId },
    /// Account removed from the treasury funding whitelist
    WhitelistedFunderRemoved { who: T::AccountId },
    /// Fee grant created by governance
    GrantCreated {
      grantee: T::AccountId,
      allowed_fee_amount: Balance,
      expiration_height: BlockNumberFor<T>,
      granted_by_proposal: u64,
    },
    /// Fee grant drawn down
    GrantUsed {
      grantee: T::AccountId,
      amount: Balance,
      remaining: Balance,
    },
    /// Fee grant revoked by governance, unused allowance discarded
    GrantRevoked { grantee: T::AccountId },
    /// Expired fee grant deleted on first use after its expiration height
    GrantLapsed { grantee: T::AccountId },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Fee abstraction is switched off in the engine parameters
    FeeAbstractionDisabled,
    /// The payer holds no equity that passes the eligibility checks
    NoEligibleEquity,
    /// Total eligible equity value does not cover fee plus markup
    InsufficientEquityValue,
    /// The exchange has no usable price for the asset
    PriceUnavailable,
    /// The exchange rejected or failed the liquidation swap
    SwapFailed,
    /// Swap proceeds fell below the slippage floor
    SlippageExceeded,
    /// The per-block abstraction cap would be exceeded
    BlockLimitExceeded,
    /// Amount is zero
    ZeroAmount,
    /// Arithmetic overflow
    ArithmeticOverflow,
    /// Rejected parameter update
    InvalidParams,
    /// Funder is neither the treasury owner nor whitelisted
    NotWhitelisted,
    /// Deposit below the configured treasury funding minimum
    BelowFundingMinimum,
    /// Treasury pool balance too low for the withdrawal
    InsufficientTreasuryFunds,
    /// No grant exists for the account
    GrantNotFound,
    /// The grant's expiration height has passed
    GrantExpired,
    /// Remaining grant allowance does not cover the requested amount
    GrantExhausted,
    /// Rejected grant creation
    InvalidGrant,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Replace the engine parameters (governance only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::update_params())]
    pub fn update_params(origin: OriginFor<T>, new_params: FeeAbstractionParams) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(
        new_params.max_slippage_bps <= defaults::BPS_DENOMINATOR,
        Error::<T>::InvalidParams
      );
      let (enabled, fee_markup_bps, max_slippage_bps) = (
        new_params.enabled,
        new_params.fee_markup_bps,
        new_params.max_slippage_bps,
      );
      Params::<T>::put(new_params);
      Self::deposit_event(Event::ParamsUpdated {
        enabled,
        fee_markup_bps,
        max_slippage_bps,
      });
      Ok(())
    }

    /// Deposit native tokens into the treasury pool.
    ///
    /// Public entry point; gated on the owner/whitelist. The ungated
    /// `fund_treasury_unchecked` primitive is reserved for internal callers.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::fund_treasury())]
    pub fn fund_treasury(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(
        amount >= Params::<T>::get().treasury_funding_minimum,
        Error::<T>::BelowFundingMinimum
      );
      Self::fund_treasury_with_whitelist(&who, amount)
    }

    /// Withdraw native tokens from the treasury pool (governance only)
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::withdraw_from_treasury())]
    pub fn withdraw_from_treasury(
      origin: OriginFor<T>,
      recipient: T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
      ensure!(
        Self::treasury_balance() >= amount,
        Error::<T>::InsufficientTreasuryFunds
      );
      T::Currency::transfer(
        &Self::account_id(),
        &recipient,
        amount,
        Preservation::Expendable,
      )
      .map(|_| ())?;
      Self::deposit_event(Event::TreasuryWithdrawal { recipient, amount });
      Ok(())
    }

    /// Assign the treasury owner (governance only)
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_treasury_owner())]
    pub fn set_treasury_owner(origin: OriginFor<T>, owner: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_set_treasury_owner(owner);
      Ok(())
    }

    /// Add an account to the treasury funding whitelist (governance only)
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::add_whitelisted_funder())]
    pub fn add_whitelisted_funder(origin: OriginFor<T>, who: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_add_whitelisted_funder(who);
      Ok(())
    }

    /// Remove an account from the treasury funding whitelist (governance only)
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::remove_whitelisted_funder())]
    pub fn remove_whitelisted_funder(origin: OriginFor<T>, who: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_remove_whitelisted_funder(who);
      Ok(())
    }

    /// Issue a fee grant to an account (governance only).
    ///
    /// Overwrites any existing grant for the grantee.
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::grant_treasury_allowance())]
    pub fn grant_treasury_allowance(
      origin: OriginFor<T>,
      grantee: T::AccountId,
      allowed_fee_amount: Balance,
      expiration_height: BlockNumberFor<T>,
      allowed_equities: EquityList,
      proposal: u64,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!allowed_fee_amount.is_zero(), Error::<T>::InvalidGrant);
      let now = <frame_system::Pallet<T>>::block_number();
      ensure!(expiration_height > now, Error::<T>::InvalidGrant);
      Grants::<T>::insert(
        &grantee,
        TreasuryFeeGrant {
          allowed_fee_amount,
          used_fee_amount: Zero::zero(),
          expiration_height,
          allowed_equities,
          granted_at_height: now,
          granted_by_proposal: proposal,
        },
      );
      Self::deposit_event(Event::GrantCreated {
        grantee,
        allowed_fee_amount,
        expiration_height,
        granted_by_proposal: proposal,
      });
      Ok(())
    }

    /// Revoke an account's fee grant, discarding any unused allowance
    /// (governance only)
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::revoke_treasury_allowance())]
    pub fn revoke_treasury_allowance(origin: OriginFor<T>, grantee: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Grants::<T>::take(&grantee).ok_or(Error::<T>::GrantNotFound)?;
      Self::deposit_event(Event::GrantRevoked { grantee });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Treasury pool account, derived from the pallet ID
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Native balance of the treasury pool
    pub fn treasury_balance() -> Balance {
      T::Currency::balance(&Self::account_id())
    }

    /// Entry point for the transaction-fee interception layer.
    ///
    /// Charges `required_fee` plus the configured markup by liquidating one of
    /// the payer's equity holdings, pays the exact fee to the fee collector,
    /// routes the swap remainder to the treasury, and returns the total amount
    /// counted against the per-block cap.
    ///
    /// Runs inside its own storage layer: any failure after the first transfer
    /// reverts every write made by the call.
    pub fn process_fee_abstraction(
      payer: &T::AccountId,
      required_fee: Balance,
    ) -> Result<Balance, DispatchError> {
      ensure!(!required_fee.is_zero(), Error::<T>::ZeroAmount);
      with_storage_layer(|| Self::do_process_fee_abstraction(payer, required_fee))
    }

    fn do_process_fee_abstraction(
      payer: &T::AccountId,
      required_fee: Balance,
    ) -> Result<Balance, DispatchError> {
      let params = Params::<T>::get();
      ensure!(params.enabled, Error::<T>::FeeAbstractionDisabled);

      let markup = Self::fee_markup(required_fee, params.fee_markup_bps)?;
      let total = required_fee
        .checked_add(markup)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      // The cap bounds the sum of fee-plus-markup totals per block, so the
      // check must use `total`, not the raw fee.
      Self::check_block_limit(total, params.max_fee_abstraction_per_block)?;

      let (total_value, eligible) = Self::user_equity_value(payer, &params)?;
      ensure!(total_value >= total, Error::<T>::InsufficientEquityValue);

      let selection = Self::select_equity(total, &eligible, params.max_slippage_bps)?;
      let received =
        Self::execute_equity_swap(payer, selection.asset, selection.quantity, &params)?;

      Self::pay_gas_fee(payer, required_fee)?;
      let remainder = received.saturating_sub(required_fee);
      Self::return_to_treasury(payer, remainder)?;

      let record_id = Self::issue_record_id();
      Records::<T>::insert(
        record_id,
        FeeAbstractionRecord {
          id: record_id,
          payer: payer.clone(),
          equity: selection.asset,
          equity_swapped: selection.quantity,
          native_received: received,
          gas_fee_paid: required_fee,
          markup_paid: markup,
          treasury_returned: remainder,
          block_height: <frame_system::Pallet<T>>::block_number(),
          timestamp: T::TimeProvider::now(),
        },
      );
      Self::increment_block_usage(total);

      Self::deposit_event(Event::FeeAbstracted {
        payer: payer.clone(),
        equity: selection.asset,
        equity_swapped: selection.quantity,
        native_received: received,
        gas_fee_paid: required_fee,
        markup_paid: markup,
        treasury_returned: remainder,
        record_id,
      });
      Ok(total)
    }

    /// Total usable equity value of an account plus the per-holding breakdown.
    ///
    /// A holding qualifies only if its asset is a registered, active equity,
    /// allowed by the whitelist (when one is set), has an open and priced
    /// market against the native token, and is worth at least
    /// `min_equity_value`.
    pub fn user_equity_value(
      who: &T::AccountId,
      params: &FeeAbstractionParams,
    ) -> Result<(Balance, Vec<EligibleEquity<Balance>>), DispatchError> {
      let mut eligible = Vec::new();
      let mut total_value: Balance = 0;
      for asset in T::EquityRegistry::equity_tokens() {
        if !T::EquityRegistry::is_equity_token(asset) {
          continue;
        }
        let info = match T::EquityRegistry::equity_info(asset) {
          Some(info) => info,
          None => continue,
        };
        if !info.active {
          continue;
        }
        if !params.enabled_equities.is_empty() && !params.enabled_equities.contains(&asset) {
          continue;
        }
        let market = match T::Exchange::market(asset, AssetKind::Native) {
          Some(market) => market,
          None => continue,
        };
        if !market.active || market.trading_halted {
          continue;
        }
        let price = match T::Exchange::market_price(asset) {
          Some(price) if !price.is_zero() => price,
          _ => continue,
        };
        let asset_id = match asset.local_id() {
          Some(id) => id,
          None => continue,
        };
        let balance = T::Assets::balance(asset_id, who);
        if balance.is_zero() {
          continue;
        }
        let native_value = Self::native_value(price, balance)?;
        if native_value < params.min_equity_value {
          continue;
        }
        total_value = total_value
          .checked_add(native_value)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        eligible.push(EligibleEquity {
          asset,
          balance,
          price,
          native_value,
        });
      }
      ensure!(!eligible.is_empty(), Error::<T>::NoEligibleEquity);
      Ok((total_value, eligible))
    }

    /// Choose the holding to liquidate and the quantity to sell.
    ///
    /// Prefers the largest holding that covers `amount_needed` outright (one
    /// swap, least price impact); falls back to the globally largest holding.
    /// The quantity over-provisions the sale by the slippage bound so a
    /// worst-case adverse move still yields enough proceeds, capped at the
    /// actual balance.
    pub fn select_equity(
      amount_needed: Balance,
      eligible: &[EligibleEquity<Balance>],
      max_slippage_bps: u32,
    ) -> Result<EquitySelection<Balance>, DispatchError> {
      let covering = eligible
        .iter()
        .filter(|entry| entry.native_value >= amount_needed)
        .max_by_key(|entry| entry.native_value);
      let choice = match covering {
        Some(entry) => entry,
        None => eligible
          .iter()
          .max_by_key(|entry| entry.native_value)
          .ok_or(Error::<T>::NoEligibleEquity)?,
      };
      let quantity =
        Self::equity_quantity(amount_needed, choice.price, max_slippage_bps)?.min(choice.balance);
      let expected_native = Self::native_value(choice.price, quantity)?;
      Ok(EquitySelection {
        asset: choice.asset,
        quantity,
        expected_native,
      })
    }

    /// Liquidate `amount` of `asset` into native tokens with slippage
    /// verification.
    ///
    /// The slippage floor is re-verified on the reported proceeds; collaborator
    /// success alone does not establish the bound.
    pub fn execute_equity_swap(
      trader: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
      params: &FeeAbstractionParams,
    ) -> Result<Balance, DispatchError> {
      let price = match T::Exchange::market_price(asset) {
        Some(price) if !price.is_zero() => price,
        _ => return Err(Error::<T>::PriceUnavailable.into()),
      };
      let expected = Self::native_value(price, amount)?;
      let min_received = Self::slippage_floor(expected, params.max_slippage_bps)?;
      let received =
        T::Exchange::execute_swap(trader, asset, amount, AssetKind::Native, min_received)
          .map_err(|_| Error::<T>::SwapFailed)?;
      ensure!(received >= min_received, Error::<T>::SlippageExceeded);
      Ok(received)
    }

    /// Transfer exactly the required fee from the payer to the fee collector
    fn pay_gas_fee(payer: &T::AccountId, required_fee: Balance) -> DispatchResult {
      T::Currency::transfer(
        payer,
        &T::FeeCollector::get(),
        required_fee,
        Preservation::Expendable,
      )
      .map(|_| ())
    }

    /// Route a positive swap remainder from the payer to the treasury pool
    fn return_to_treasury(payer: &T::AccountId, remainder: Balance) -> DispatchResult {
      if remainder.is_zero() {
        return Ok(());
      }
      T::Currency::transfer(
        payer,
        &Self::account_id(),
        remainder,
        Preservation::Expendable,
      )
      .map(|_| ())
    }

    /// Abstracted-fee volume charged so far in the current block
    pub fn current_block_usage() -> Balance {
      let usage = BlockUsage::<T>::get();
      if usage.height == <frame_system::Pallet<T>>::block_number() {
        usage.used
      } else {
        Zero::zero()
      }
    }

    fn check_block_limit(amount: Balance, cap: Balance) -> DispatchResult {
      let projected = Self::current_block_usage()
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      ensure!(projected <= cap, Error::<T>::BlockLimitExceeded);
      Ok(())
    }

    fn increment_block_usage(amount: Balance) {
      // This read-modify-write under the current height is what performs the
      // lazy reset; no begin-of-block hook exists.
      BlockUsage::<T>::put(BlockUsageCounter {
        height: <frame_system::Pallet<T>>::block_number(),
        used: Self::current_block_usage().saturating_add(amount),
      });
    }

    fn issue_record_id() -> u64 {
      let id = RecordCounter::<T>::get().saturating_add(1);
      RecordCounter::<T>::put(id);
      id
    }

    /// Whether the account may deposit into the treasury pool
    pub fn can_fund_treasury(who: &T::AccountId) -> bool {
      TreasuryOwner::<T>::get().map_or(false, |owner| &owner == who)
        || TreasuryWhitelist::<T>::contains_key(who)
    }

    /// Whether the account is on the treasury funding whitelist
    pub fn is_whitelisted(who: &T::AccountId) -> bool {
      TreasuryWhitelist::<T>::contains_key(who)
    }

    /// Gated treasury deposit: owner or whitelisted funders only
    pub fn fund_treasury_with_whitelist(funder: &T::AccountId, amount: Balance) -> DispatchResult {
      ensure!(Self::can_fund_treasury(funder), Error::<T>::NotWhitelisted);
      Self::fund_treasury_unchecked(funder, amount)
    }

    /// Ungated treasury deposit primitive.
    ///
    /// Not wired to any public entry point; the extrinsic layer must use the
    /// whitelist-gated path.
    pub fn fund_treasury_unchecked(funder: &T::AccountId, amount: Balance) -> DispatchResult {
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
      T::Currency::transfer(funder, &Self::account_id(), amount, Preservation::Preserve)
        .map(|_| ())?;
      Self::deposit_event(Event::TreasuryFunded {
        funder: funder.clone(),
        amount,
      });
      Ok(())
    }

    /// Draw `amount` from an account's fee grant.
    ///
    /// An expired grant is deleted on this first post-expiration use and the
    /// call fails with `GrantExpired`. A draw that would push usage past the
    /// allowance fails with `GrantExhausted` and leaves the grant unchanged.
    pub fn use_grant(grantee: &T::AccountId, amount: Balance) -> DispatchResult {
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
      let mut grant = Grants::<T>::get(grantee).ok_or(Error::<T>::GrantNotFound)?;
      let now = <frame_system::Pallet<T>>::block_number();
      if now > grant.expiration_height {
        Grants::<T>::remove(grantee);
        Self::deposit_event(Event::GrantLapsed {
          grantee: grantee.clone(),
        });
        return Err(Error::<T>::GrantExpired.into());
      }
      let remaining = grant
        .allowed_fee_amount
        .saturating_sub(grant.used_fee_amount);
      ensure!(remaining >= amount, Error::<T>::GrantExhausted);
      grant.used_fee_amount = grant.used_fee_amount.saturating_add(amount);
      let remaining = grant
        .allowed_fee_amount
        .saturating_sub(grant.used_fee_amount);
      Grants::<T>::insert(grantee, grant);
      Self::deposit_event(Event::GrantUsed {
        grantee: grantee.clone(),
        amount,
        remaining,
      });
      Ok(())
    }

    /// Pure owner assignment; authority gating lives in the extrinsic layer
    pub fn do_set_treasury_owner(owner: T::AccountId) {
      TreasuryOwner::<T>::put(&owner);
      Self::deposit_event(Event::TreasuryOwnerSet { owner });
    }

    /// Pure whitelist insertion; authority gating lives in the extrinsic layer
    pub fn do_add_whitelisted_funder(who: T::AccountId) {
      TreasuryWhitelist::<T>::insert(&who, ());
      Self::deposit_event(Event::WhitelistedFunderAdded { who });
    }

    /// Pure whitelist removal; authority gating lives in the extrinsic layer
    pub fn do_remove_whitelisted_funder(who: T::AccountId) {
      TreasuryWhitelist::<T>::remove(&who);
      Self::deposit_event(Event::WhitelistedFunderRemoved { who });
    }

    /// All whitelisted funder accounts (prefix scan)
    pub fn whitelisted_funders() -> Vec<T::AccountId> {
      TreasuryWhitelist::<T>::iter_keys().collect()
    }

    /// floor(fee * markup_bps / 10_000)
    fn fee_markup(fee: Balance, markup_bps: u32) -> Result<Balance, DispatchError> {
      let markup = U256::from(fee)
        .saturating_mul(U256::from(markup_bps))
        .checked_div(U256::from(defaults::BPS_DENOMINATOR))
        .unwrap_or(U256::zero());
      Self::to_balance(markup)
    }

    /// Truncating native value of `amount` equity units at `price`
    fn native_value(price: Balance, amount: Balance) -> Result<Balance, DispatchError> {
      let value = U256::from(price)
        .saturating_mul(U256::from(amount))
        .checked_div(U256::from(T::Precision::get()))
        .unwrap_or(U256::zero());
      Self::to_balance(value)
    }

    /// ceil(amount_needed / price * (1 + max_slippage))
    fn equity_quantity(
      amount_needed: Balance,
      price: Balance,
      max_slippage_bps: u32,
    ) -> Result<Balance, DispatchError> {
      let bps = U256::from(defaults::BPS_DENOMINATOR);
      let numerator = U256::from(amount_needed)
        .saturating_mul(bps.saturating_add(U256::from(max_slippage_bps)))
        .saturating_mul(U256::from(T::Precision::get()));
      let denominator = U256::from(price).saturating_mul(bps);
      if denominator.is_zero() {
        return Err(Error::<T>::PriceUnavailable.into());
      }
      let quantity = numerator
        .saturating_add(denominator.saturating_sub(U256::one()))
        .checked_div(denominator)
        .unwrap_or(U256::zero());
      Self::to_balance(quantity)
    }

    /// Truncating slippage floor: expected * (10_000 - max_slippage_bps) / 10_000
    fn slippage_floor(expected: Balance, max_slippage_bps: u32) -> Result<Balance, DispatchError> {
      let keep = defaults::BPS_DENOMINATOR.saturating_sub(max_slippage_bps);
      let floor = U256::from(expected)
        .saturating_mul(U256::from(keep))
        .checked_div(U256::from(defaults::BPS_DENOMINATOR))
        .unwrap_or(U256::zero());
      Self::to_balance(floor)
    }

    fn to_balance(value: U256) -> Result<Balance, DispatchError> {
      if value > U256::from(u128::MAX) {
        return Err(Error::<T>::ArithmeticOverflow.into());
      }
      Ok(value.as_u128())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Initial treasury owner with elevated deposit rights
    pub treasury_owner: Option<T::AccountId>,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(owner) = &self.treasury_owner {
        TreasuryOwner::<T>::put(owner.clone());
      }
      // Pool and collector accounts survive zero native balance (ED-free)
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      frame_system::Pallet::<T>::inc_providers(&T::FeeCollector::get());
    }
  }
}
