use std::ops::Deref;

use alloy::primitives::{U160, U256, Uint};
use malachite::{
    Natural,
    num::{arithmetic::traits::FloorRoot, logic::traits::SignificantBits}
};
use uniswap_v3_math::tick_math::get_tick_at_sqrt_ratio;

use crate::pool::PoolError;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SqrtPriceX96(U160);

impl SqrtPriceX96 {
    /// Initial price of a pool holding `reserve_a` of token0 and `reserve_b`
    /// of token1: `floor(sqrt(reserve_b)) * 2^96 / floor(sqrt(reserve_a))`.
    ///
    /// Both square roots are taken on integers before the division, matching
    /// how the reserves were sized in the first place.
    pub fn from_reserves(reserve_a: U256, reserve_b: U256) -> Result<Self, PoolError> {
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(PoolError::EmptyReserve)
        }

        let sqrt_a = Natural::from_limbs_asc(reserve_a.as_limbs()).floor_root(2);
        let sqrt_b = Natural::from_limbs_asc(reserve_b.as_limbs()).floor_root(2);
        let price = (sqrt_b << 96u64) / sqrt_a;

        if price.significant_bits() > 160 {
            return Err(PoolError::PriceOverflow)
        }

        Ok(Self(Uint::from_limbs_slice(&price.into_limbs_asc())))
    }

    /// Greatest tick whose price does not exceed this one.
    pub fn to_tick(&self) -> eyre::Result<i32> {
        Ok(get_tick_at_sqrt_ratio(U256::from(self.0))?)
    }
}

impl Deref for SqrtPriceX96 {
    type Target = U160;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q96: U160 = U160::from_limbs([0, 1 << 32, 0]);

    #[test]
    fn equal_reserves_price_at_one() {
        let reserve = U256::from(1_000_000_000_000u64);
        let price = SqrtPriceX96::from_reserves(reserve, reserve).unwrap();

        assert_eq!(*price, Q96);
        assert_eq!(price.to_tick().unwrap(), 0);
    }

    #[test]
    fn square_roots_are_floored_before_dividing() {
        // sqrt(4) / sqrt(1) inverted: token1 is the scarcer side
        let price = SqrtPriceX96::from_reserves(U256::from(4), U256::from(1)).unwrap();
        assert_eq!(*price, Q96 >> 1);
        assert!(price.to_tick().unwrap() < 0);

        // floor(sqrt(10)) == 3 and floor(sqrt(99)) == 9
        let price = SqrtPriceX96::from_reserves(U256::from(10), U256::from(99)).unwrap();
        assert_eq!(*price, Q96 * U160::from(3));
    }

    #[test]
    fn rejects_empty_reserves() {
        assert!(matches!(
            SqrtPriceX96::from_reserves(U256::ZERO, U256::from(1)),
            Err(PoolError::EmptyReserve)
        ));
        assert!(matches!(
            SqrtPriceX96::from_reserves(U256::from(1), U256::ZERO),
            Err(PoolError::EmptyReserve)
        ));
    }

    #[test]
    fn rejects_prices_wider_than_160_bits() {
        assert!(matches!(
            SqrtPriceX96::from_reserves(U256::from(1), U256::MAX),
            Err(PoolError::PriceOverflow)
        ));
    }
}
