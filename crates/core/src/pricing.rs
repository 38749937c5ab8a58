use alloy::primitives::Address;
use bigdecimal::{BigDecimal, One, Zero};

use crate::engine::Engine;
use crate::resolver::PairResolver;

impl<R: PairResolver> Engine<R> {
    /// Reserve-weighted USD price of the quote asset, averaged over the
    /// seed pools that exist in the store. Yields zero until the first
    /// seed pool has synced.
    pub fn quote_price_usd(&self) -> BigDecimal {
        let mut weighted: Vec<(BigDecimal, BigDecimal)> = Vec::new();
        let mut total_quote_reserve = BigDecimal::zero();

        for seed in &self.params.seed_pairs {
            let Some(pair) = self.store.pair(&seed.pair) else {
                continue;
            };
            // The stable side quotes the other side's USD price directly.
            let (quote_reserve, usd_price) = if seed.stable_is_token0 {
                (pair.reserve1.clone(), pair.token0_price.clone())
            } else {
                (pair.reserve0.clone(), pair.token1_price.clone())
            };
            total_quote_reserve += &quote_reserve;
            weighted.push((quote_reserve, usd_price));
        }

        if total_quote_reserve.is_zero() {
            return BigDecimal::zero();
        }

        let mut price = BigDecimal::zero();
        for (reserve, usd) in &weighted {
            price += usd * &(reserve / &total_quote_reserve);
        }
        price
    }

    /// Price of `token` in quote-asset units, derived through the first
    /// whitelisted counterpart it shares a sufficiently deep pool with.
    /// The whitelist order decides which pool wins, not pool depth.
    pub fn derived_quote_price(&self, token: Address) -> BigDecimal {
        if token == self.params.quote_token {
            return BigDecimal::one();
        }

        for candidate in &self.params.whitelist {
            if *candidate == token {
                continue;
            }
            let Some(pair_address) = self.resolve_pair(token, *candidate) else {
                continue;
            };
            let Some(pair) = self.store.pair(&pair_address) else {
                continue;
            };
            if pair.reserve_quote <= self.params.minimum_quote_liquidity {
                continue;
            }
            if pair.token0 == token {
                if let Some(other) = self.store.token(&pair.token1) {
                    return &pair.token1_price * &other.derived_quote;
                }
            } else if pair.token1 == token {
                if let Some(other) = self.store.token(&pair.token0) {
                    return &pair.token0_price * &other.derived_quote;
                }
            }
        }

        BigDecimal::zero()
    }
}
