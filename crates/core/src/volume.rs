use bigdecimal::{BigDecimal, Zero};
use tidewatch_store::{Pair, Token};

use crate::engine::Engine;
use crate::params::PricingParams;
use crate::resolver::PairResolver;

/// Which sides of a pool carry a whitelisted token. Decides how much of a
/// swap or reserve is trusted at USD valuation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistSide {
    Neither,
    Token0Only,
    Token1Only,
    Both,
}

impl PricingParams {
    pub fn whitelist_side(&self, token0: &Token, token1: &Token) -> WhitelistSide {
        match (
            self.is_whitelisted(&token0.id),
            self.is_whitelisted(&token1.id),
        ) {
            (true, true) => WhitelistSide::Both,
            (true, false) => WhitelistSide::Token0Only,
            (false, true) => WhitelistSide::Token1Only,
            (false, false) => WhitelistSide::Neither,
        }
    }
}

impl<R: PairResolver> Engine<R> {
    /// Trusted USD value of one swap. Untrusted legs contribute nothing:
    /// both sides whitelisted averages the two legs, one side takes that
    /// leg alone, neither side yields zero. Pools with fewer than five
    /// providers must additionally clear the tracked-reserve floor on
    /// their whitelisted side(s).
    pub fn tracked_volume_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
        pair: &Pair,
    ) -> BigDecimal {
        let price0 = &token0.derived_quote * &self.bundle.quote_price_usd;
        let price1 = &token1.derived_quote * &self.bundle.quote_price_usd;
        let side = self.params.whitelist_side(token0, token1);

        if pair.liquidity_provider_count < 5 {
            let reserve0_usd = &pair.reserve0 * &price0;
            let reserve1_usd = &pair.reserve1 * &price1;
            let floor = &self.params.minimum_tracked_reserve_usd;
            let deep_enough = match side {
                WhitelistSide::Both => &(&reserve0_usd + &reserve1_usd) >= floor,
                WhitelistSide::Token0Only => &reserve0_usd >= floor,
                WhitelistSide::Token1Only => &reserve1_usd >= floor,
                WhitelistSide::Neither => false,
            };
            if !deep_enough {
                return BigDecimal::zero();
            }
        }

        match side {
            WhitelistSide::Both => {
                (amount0 * &price0 + amount1 * &price1) / BigDecimal::from(2)
            }
            WhitelistSide::Token0Only => amount0 * &price0,
            WhitelistSide::Token1Only => amount1 * &price1,
            WhitelistSide::Neither => BigDecimal::zero(),
        }
    }

    /// Trusted USD value of a pool's reserves. A single whitelisted side
    /// stands in for the other by doubling; no provider-count guard here.
    pub fn tracked_liquidity_usd(
        &self,
        reserve0: &BigDecimal,
        token0: &Token,
        reserve1: &BigDecimal,
        token1: &Token,
    ) -> BigDecimal {
        let price0 = &token0.derived_quote * &self.bundle.quote_price_usd;
        let price1 = &token1.derived_quote * &self.bundle.quote_price_usd;

        match self.params.whitelist_side(token0, token1) {
            WhitelistSide::Both => reserve0 * &price0 + reserve1 * &price1,
            WhitelistSide::Token0Only => reserve0 * &price0 * BigDecimal::from(2),
            WhitelistSide::Token1Only => reserve1 * &price1 * BigDecimal::from(2),
            WhitelistSide::Neither => BigDecimal::zero(),
        }
    }
}
