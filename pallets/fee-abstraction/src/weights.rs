#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn update_params() -> Weight;
	fn fund_treasury() -> Weight;
	fn withdraw_from_treasury() -> Weight;
	fn set_treasury_owner() -> Weight;
	fn add_whitelisted_funder() -> Weight;
	fn remove_whitelisted_funder() -> Weight;
	fn grant_treasury_allowance() -> Weight;
	fn revoke_treasury_allowance() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn update_params() -> Weight {
		Weight::from_parts(15_000_000, 1500)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn fund_treasury() -> Weight {
		Weight::from_parts(40_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn withdraw_from_treasury() -> Weight {
		Weight::from_parts(40_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn set_treasury_owner() -> Weight {
		Weight::from_parts(10_000_000, 1000)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn add_whitelisted_funder() -> Weight {
		Weight::from_parts(10_000_000, 1000)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn remove_whitelisted_funder() -> Weight {
		Weight::from_parts(10_000_000, 1000)
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn grant_treasury_allowance() -> Weight {
		Weight::from_parts(20_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn revoke_treasury_allowance() -> Weight {
		Weight::from_parts(15_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn update_params() -> Weight {
		Weight::from_parts(15_000_000, 1500)
	}
	fn fund_treasury() -> Weight {
		Weight::from_parts(40_000_000, 3000)
	}
	fn withdraw_from_treasury() -> Weight {
		Weight::from_parts(40_000_000, 3000)
	}
	fn set_treasury_owner() -> Weight {
		Weight::from_parts(10_000_000, 1000)
	}
	fn add_whitelisted_funder() -> Weight {
		Weight::from_parts(10_000_000, 1000)
	}
	fn remove_whitelisted_funder() -> Weight {
		Weight::from_parts(10_000_000, 1000)
	}
	fn grant_treasury_allowance() -> Weight {
		Weight::from_parts(20_000_000, 1500)
	}
	fn revoke_treasury_allowance() -> Weight {
		Weight::from_parts(15_000_000, 1500)
	}
}
