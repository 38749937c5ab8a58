use bigdecimal::BigDecimal;

/// Current USD price of the protocol's quote asset. Refreshed on every
/// Sync, threaded explicitly through pricing and handler calls.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub quote_price_usd: BigDecimal,
}

/// Factory-level running totals. Volume fields only ever grow; the
/// liquidity fields are re-derived on every Sync by retracting the
/// emitting pair's previous contribution and adding its new one.
#[derive(Debug, Clone, Default)]
pub struct ProtocolTotals {
    pub total_volume_quote: BigDecimal,
    pub total_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_liquidity_quote: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
    pub tx_count: u64,
    pub pair_count: u64,
}
