use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::EnsureOrigin;
use polkadot_sdk::frame_support::traits::fungible::Mutate as NativeMutate;
use polkadot_sdk::frame_system::RawOrigin;

#[benchmarks]
mod benches {
  use super::*;

  fn admin_origin<T: Config>() -> T::RuntimeOrigin {
    T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin")
  }

  #[benchmark]
  fn update_params() {
    let mut params = FeeAbstractionParams::default();
    params.enabled = true;
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    update_params(origin as T::RuntimeOrigin, params);

    assert!(Params::<T>::get().enabled);
  }

  #[benchmark]
  fn fund_treasury() {
    let caller: T::AccountId = whitelisted_caller();
    TreasuryWhitelist::<T>::insert(&caller, ());
    let amount = Params::<T>::get().treasury_funding_minimum.max(1);
    T::Currency::mint_into(&caller, amount.saturating_mul(4)).expect("minting failed");

    #[extrinsic_call]
    fund_treasury(RawOrigin::Signed(caller), amount);
  }

  #[benchmark]
  fn withdraw_from_treasury() {
    let recipient: T::AccountId = whitelisted_caller();
    T::Currency::mint_into(&Pallet::<T>::account_id(), 1_000_000).expect("minting failed");
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    withdraw_from_treasury(origin as T::RuntimeOrigin, recipient, 500_000);
  }

  #[benchmark]
  fn set_treasury_owner() {
    let owner: T::AccountId = whitelisted_caller();
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    set_treasury_owner(origin as T::RuntimeOrigin, owner.clone());

    assert_eq!(TreasuryOwner::<T>::get(), Some(owner));
  }

  #[benchmark]
  fn add_whitelisted_funder() {
    let who: T::AccountId = whitelisted_caller();
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    add_whitelisted_funder(origin as T::RuntimeOrigin, who.clone());

    assert!(TreasuryWhitelist::<T>::contains_key(&who));
  }

  #[benchmark]
  fn remove_whitelisted_funder() {
    let who: T::AccountId = whitelisted_caller();
    TreasuryWhitelist::<T>::insert(&who, ());
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    remove_whitelisted_funder(origin as T::RuntimeOrigin, who.clone());

    assert!(!TreasuryWhitelist::<T>::contains_key(&who));
  }

  #[benchmark]
  fn grant_treasury_allowance() {
    let grantee: T::AccountId = whitelisted_caller();
    let expiration = polkadot_sdk::frame_system::Pallet::<T>::block_number() + 100u32.into();
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    grant_treasury_allowance(
      origin as T::RuntimeOrigin,
      grantee.clone(),
      1_000_000,
      expiration,
      Default::default(),
      1,
    );

    assert!(Grants::<T>::contains_key(&grantee));
  }

  #[benchmark]
  fn revoke_treasury_allowance() {
    let grantee: T::AccountId = whitelisted_caller();
    let now = polkadot_sdk::frame_system::Pallet::<T>::block_number();
    Grants::<T>::insert(
      &grantee,
      TreasuryFeeGrant {
        allowed_fee_amount: 1_000_000,
        used_fee_amount: 0,
        expiration_height: now + 100u32.into(),
        allowed_equities: Default::default(),
        granted_at_height: now,
        granted_by_proposal: 1,
      },
    );
    let origin = admin_origin::<T>();

    #[extrinsic_call]
    revoke_treasury_allowance(origin as T::RuntimeOrigin, grantee.clone());

    assert!(!Grants::<T>::contains_key(&grantee));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
