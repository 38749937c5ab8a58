use alloy::primitives::{address, Address};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One of the fixed pools seeding the quote-asset USD oracle: the quote
/// asset paired against a stablecoin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPair {
    pub pair: Address,
    /// Which side of the pool holds the stablecoin. The opposite side is
    /// the quote asset, whose reserve weights this seed in the average.
    pub stable_is_token0: bool,
}

/// Pricing and trust-filter parameters. The whitelist is ordered: the
/// derived-price search takes the first qualifying candidate, not the
/// best-priced one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingParams {
    pub quote_token: Address,
    pub seed_pairs: Vec<SeedPair>,
    pub whitelist: Vec<Address>,
    /// USD floor a thinly-provisioned pool (< 5 LPs) must clear before its
    /// swaps count toward tracked volume.
    pub minimum_tracked_reserve_usd: BigDecimal,
    /// Quote-asset reserve a pool must exceed to serve as a price source.
    pub minimum_quote_liquidity: BigDecimal,
}

impl PricingParams {
    /// Original deployment: WBNB quote asset, BUSD/DAI/USDT seed pools.
    pub fn bsc_mainnet() -> Self {
        Self {
            quote_token: address!("0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
            seed_pairs: vec![
                SeedPair {
                    // BUSD-WBNB, busd is token1
                    pair: address!("0xe415f82e756027cfcc212d04dd9121a3f7080e8a"),
                    stable_is_token0: false,
                },
                SeedPair {
                    // DAI-WBNB, dai is token0
                    pair: address!("0x6188ae138273e000e20ffca1b942387b0d1764f5"),
                    stable_is_token0: true,
                },
                SeedPair {
                    // USDT-WBNB, usdt is token0
                    pair: address!("0x4d9f415bb0c31c978e3f0d0ba77239126638875e"),
                    stable_is_token0: true,
                },
            ],
            whitelist: vec![
                address!("0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"), // WBNB
                address!("0x1af3f329e8be154074d8769d1ffa4ee058b1dbc3"), // DAI
                address!("0xe9e7cea3dedca5984780bafc599bd69add087d56"), // BUSD
                address!("0x55d398326f99059ff775485246999027b3197955"), // USDT
                address!("0x32dffc3fe8e3ef3571bf8a72c0d0015c5373f41d"), // JULb
                address!("0xc5137e8e017799e71a65e0cfe3f340d719af17d3"), // ETHb
                address!("0x7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c"), // BTCB
                address!("0x5a41f637c3f7553dba6ddc2d3ca92641096577ea"), // JULd
                address!("0xe40255c5d7fa7ceec5120408c78c787cecb4cfdb"), // SWGb
                address!("0xe49ed1b44117bb7379c1506cf5815ae33089e1a7"), // OBRb
                address!("0x7083609fce4d1d8dc0c979aab8c869ea2c873402"), // DOT
                address!("0x3f515f0a8e93f2e2f891ceeb3db4e62e202d7110"), // VIDT
                address!("0x4b0f1812e5df2a09796481ff14017e6005508003"), // TWT
                address!("0xc1d99537392084cc02d3f52386729b79d01035ce"), // SBS
            ],
            minimum_tracked_reserve_usd: BigDecimal::from(400_000),
            minimum_quote_liquidity: BigDecimal::from(2),
        }
    }

    pub fn is_whitelisted(&self, token: &Address) -> bool {
        self.whitelist.contains(token)
    }
}

impl Default for PricingParams {
    fn default() -> Self {
        Self::bsc_mainnet()
    }
}
