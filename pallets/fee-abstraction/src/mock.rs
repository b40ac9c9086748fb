use crate as pallet_fee_abstraction;
use crate::types::{EquityInfo, EquityRegistryApi, ExchangeApi, Market};

use polkadot_sdk::frame_support::traits::fungible::Mutate as FungibleMutate;
use polkadot_sdk::frame_support::traits::fungibles::Mutate as FungiblesMutate;
use polkadot_sdk::frame_support::traits::tokens::{Fortitude, Precision, Preservation};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Currency, Get, Time},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};

use primitives::{AssetInspector, AssetKind, ecosystem::params::PRECISION, well_known};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const PAYER: u64 = 1;
pub const OTHER: u64 = 2;
pub const OWNER: u64 = 10;
pub const WHITELISTED: u64 = 11;
pub const OUTSIDER: u64 = 12;
pub const FEE_COLLECTOR: u64 = 777;

pub const ACME: AssetKind = AssetKind::Local(well_known::ACME);
pub const GLOBEX: AssetKind = AssetKind::Local(well_known::GLOBEX);
pub const INITECH: AssetKind = AssetKind::Local(well_known::INITECH);
pub const HOOLI: AssetKind = AssetKind::Local(well_known::HOOLI);
pub const USDQ: AssetKind = AssetKind::Local(well_known::USDQ);

// State containers for stateful mocks
thread_local! {
    // Registry entries: asset -> (issuer_id, active, total_supply, is_equity)
    pub static REGISTRY: RefCell<BTreeMap<AssetKind, (u32, bool, u128, bool)>> = const { RefCell::new(BTreeMap::new()) };

    // Markets vs Native: asset -> (active, trading_halted, last_price)
    pub static MARKETS: RefCell<BTreeMap<AssetKind, (bool, bool, u128)>> = const { RefCell::new(BTreeMap::new()) };

    // Execution price overrides; defaults to the market price when absent
    pub static EXEC_PRICES: RefCell<BTreeMap<AssetKind, u128>> = const { RefCell::new(BTreeMap::new()) };

    // Force the next swap to fail at the collaborator level
    pub static FAIL_SWAP: RefCell<bool> = const { RefCell::new(false) };

    // Whether the mock exchange enforces min_received itself. Disabled to
    // model a collaborator that reports success despite a slippage breach.
    pub static ENFORCE_MIN_RECEIVED: RefCell<bool> = const { RefCell::new(true) };
}

// Helper methods to setup state

pub fn register_equity(asset: AssetKind, issuer_id: u32, active: bool) {
  REGISTRY.with(|r| {
    r.borrow_mut().insert(asset, (issuer_id, active, 1_000_000, true));
  });
}

/// A registry listing that is not an equity token (defensive-check fixture)
pub fn register_listed_non_equity(asset: AssetKind) {
  REGISTRY.with(|r| {
    r.borrow_mut().insert(asset, (0, true, 1_000_000, false));
  });
}

pub fn set_market(asset: AssetKind, active: bool, trading_halted: bool, last_price: u128) {
  MARKETS.with(|m| {
    m.borrow_mut().insert(asset, (active, trading_halted, last_price));
  });
}

pub fn set_exec_price(asset: AssetKind, price: u128) {
  EXEC_PRICES.with(|p| {
    p.borrow_mut().insert(asset, price);
  });
}

pub fn set_swap_failure(fail: bool) {
  FAIL_SWAP.with(|f| *f.borrow_mut() = fail);
}

pub fn set_collaborator_enforces_min(enforce: bool) {
  ENFORCE_MIN_RECEIVED.with(|e| *e.borrow_mut() = enforce);
}

pub fn mint_equity(who: u64, asset: AssetKind, amount: u128) {
  let id = asset.local_id().expect("equity assets are Local");
  let _ = Assets::mint_into(id, &who, amount);
}

pub fn set_params(params: pallet_fee_abstraction::FeeAbstractionParams) {
  pallet_fee_abstraction::Params::<Test>::put(params);
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    FeeAbstraction: pallet_fee_abstraction,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

// MOCK IMPLEMENTATIONS

pub struct MockEquityRegistry;
impl EquityRegistryApi<u128> for MockEquityRegistry {
  fn is_equity_token(asset: AssetKind) -> bool {
    REGISTRY.with(|r| {
      r.borrow()
        .get(&asset)
        .map(|(_, _, _, is_equity)| *is_equity)
        .unwrap_or(false)
    })
  }

  fn equity_info(asset: AssetKind) -> Option<EquityInfo<u128>> {
    REGISTRY.with(|r| {
      r.borrow()
        .get(&asset)
        .map(|(issuer_id, active, total_supply, _)| EquityInfo {
          issuer_id: *issuer_id,
          active: *active,
          total_supply: *total_supply,
        })
    })
  }

  fn equity_tokens() -> Vec<AssetKind> {
    REGISTRY.with(|r| r.borrow().keys().cloned().collect())
  }
}

pub struct MockExchange;
impl ExchangeApi<u64, u128> for MockExchange {
  fn market(base: AssetKind, quote: AssetKind) -> Option<Market<u128>> {
    if quote != AssetKind::Native {
      return None;
    }
    MARKETS.with(|m| {
      m.borrow()
        .get(&base)
        .map(|(active, trading_halted, last_price)| Market {
          active: *active,
          trading_halted: *trading_halted,
          last_price: *last_price,
        })
    })
  }

  fn market_price(asset: AssetKind) -> Option<u128> {
    MARKETS.with(|m| m.borrow().get(&asset).map(|(_, _, price)| *price))
  }

  fn execute_swap(
    trader: &u64,
    from: AssetKind,
    amount_in: u128,
    to: AssetKind,
    min_received: u128,
  ) -> Result<u128, DispatchError> {
    if to != AssetKind::Native {
      return Err(DispatchError::Other("unsupported quote asset"));
    }
    if FAIL_SWAP.with(|f| *f.borrow()) {
      return Err(DispatchError::Other("exchange offline"));
    }
    let exec_price = EXEC_PRICES
      .with(|p| p.borrow().get(&from).cloned())
      .or_else(|| Self::market_price(from))
      .ok_or(DispatchError::Other("no market"))?;
    let received = amount_in.saturating_mul(exec_price) / PRECISION;
    if ENFORCE_MIN_RECEIVED.with(|e| *e.borrow()) && received < min_received {
      return Err(DispatchError::Other("exchange slippage"));
    }
    let id = from
      .local_id()
      .ok_or(DispatchError::Other("invalid base asset"))?;
    <Assets as FungiblesMutate<u64>>::burn_from(
      id,
      trader,
      amount_in,
      Preservation::Expendable,
      Precision::Exact,
      Fortitude::Polite,
    )?;
    <Balances as FungibleMutate<u64>>::mint_into(trader, received)?;
    Ok(received)
  }
}

pub struct MockTime;
impl Time for MockTime {
  type Moment = u64;
  fn now() -> u64 {
    System::block_number().saturating_mul(6_000)
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::FEE_ABSTRACTION_PALLET_ID)
  }
}

impl pallet_fee_abstraction::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type Exchange = MockExchange;
  type EquityRegistry = MockEquityRegistry;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type PalletId = PalletIdStub;
  type FeeCollector = ConstU64<FEE_COLLECTOR>;
  type Precision = ConstU128<PRECISION>;
  type TimeProvider = MockTime;
  type WeightInfo = ();
}

/// Default engine parameters used by most tests; individual tests override
/// what they need via `set_params`.
pub fn test_params() -> pallet_fee_abstraction::FeeAbstractionParams {
  pallet_fee_abstraction::FeeAbstractionParams {
    enabled: true,
    fee_markup_bps: 50,
    max_slippage_bps: 500,
    min_equity_value: 0,
    max_fee_abstraction_per_block: 100_000_000,
    treasury_funding_minimum: 1,
    enabled_equities: Default::default(),
  }
}

pub fn treasury_account() -> u64 {
  FeeAbstraction::account_id()
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let ext = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();
  let mut ext: polkadot_sdk::sp_io::TestExternalities = ext.into();

  // Reset thread locals
  REGISTRY.with(|r| r.borrow_mut().clear());
  MARKETS.with(|m| m.borrow_mut().clear());
  EXEC_PRICES.with(|p| p.borrow_mut().clear());
  FAIL_SWAP.with(|f| *f.borrow_mut() = false);
  ENFORCE_MIN_RECEIVED.with(|e| *e.borrow_mut() = true);

  ext.execute_with(|| {
    System::set_block_number(1);

    // Pre-fund accounts with native balance
    for acc in [PAYER, OTHER, OWNER, WHITELISTED, OUTSIDER] {
      let _ = Balances::deposit_creating(&acc, 10_000_000);
    }
    let _ = Balances::deposit_creating(&FEE_COLLECTOR, 1_000);
    let _ = Balances::deposit_creating(&treasury_account(), 1_000);

    // Create the well-known issued tokens (account 1 is creator)
    for asset in [ACME, GLOBEX, INITECH, HOOLI, USDQ] {
      let id = asset.local_id().unwrap();
      let _ = Assets::create(RuntimeOrigin::signed(PAYER), id, PAYER, 1);
    }

    // Register the default equities on active markets
    register_equity(ACME, 1, true);
    register_equity(GLOBEX, 2, true);
    register_equity(INITECH, 3, true);
    set_market(ACME, true, false, 15_000 * PRECISION);
    set_market(GLOBEX, true, false, 5_000 * PRECISION);
    set_market(INITECH, true, false, 100 * PRECISION);

    set_params(test_params());
  });
  ext
}
