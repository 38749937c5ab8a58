use alloy::primitives::{Address, B256};
use bigdecimal::{BigDecimal, Zero};

/// ERC-20 token seen on at least one indexed pair. Created on first
/// reference, never deleted.
#[derive(Debug, Clone)]
pub struct Token {
    pub id: Address,
    pub decimals: u32,
    pub trade_volume: BigDecimal,
    pub trade_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_liquidity: BigDecimal,
    /// Price expressed in the protocol's quote asset.
    pub derived_quote: BigDecimal,
    pub tx_count: u64,
}

impl Token {
    pub fn new(id: Address, decimals: u32) -> Self {
        Self {
            id,
            decimals,
            trade_volume: BigDecimal::zero(),
            trade_volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            total_liquidity: BigDecimal::zero(),
            derived_quote: BigDecimal::zero(),
            tx_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pair {
    pub id: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub total_supply: BigDecimal,
    /// reserve0 / reserve1: token0 units per one token1.
    pub token0_price: BigDecimal,
    /// reserve1 / reserve0: token1 units per one token0.
    pub token1_price: BigDecimal,
    pub reserve_quote: BigDecimal,
    pub reserve_usd: BigDecimal,
    /// Trust-weighted reserve; zero for pools with no whitelisted side.
    pub tracked_reserve_quote: BigDecimal,
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub tx_count: u64,
    pub liquidity_provider_count: u64,
    pub created_at_timestamp: u64,
    pub created_at_block: u64,
}

impl Pair {
    pub fn new(id: Address, token0: Address, token1: Address, timestamp: u64, block: u64) -> Self {
        Self {
            id,
            token0,
            token1,
            reserve0: BigDecimal::zero(),
            reserve1: BigDecimal::zero(),
            total_supply: BigDecimal::zero(),
            token0_price: BigDecimal::zero(),
            token1_price: BigDecimal::zero(),
            reserve_quote: BigDecimal::zero(),
            reserve_usd: BigDecimal::zero(),
            tracked_reserve_quote: BigDecimal::zero(),
            volume_token0: BigDecimal::zero(),
            volume_token1: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            tx_count: 0,
            liquidity_provider_count: 0,
            created_at_timestamp: timestamp,
            created_at_block: block,
        }
    }
}

/// Per-transaction ledger of logical event ids. The sequences are ordered:
/// the reconciler peeks at the last element to decide whether a pending
/// mint/burn is still open, pops a folded fee mint, and replaces the slot
/// of a split burn it completes.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: B256,
    pub block_number: u64,
    pub timestamp: u64,
    pub mints: Vec<String>,
    pub burns: Vec<String>,
    pub swaps: Vec<String>,
}

impl Transaction {
    pub fn new(id: B256, block_number: u64, timestamp: u64) -> Self {
        Self {
            id,
            block_number,
            timestamp,
            mints: Vec::new(),
            burns: Vec::new(),
            swaps: Vec::new(),
        }
    }
}

/// Two-phase record: the reconciler creates it pending (no sender), the
/// Mint handler completes it with amounts and USD value.
#[derive(Debug, Clone)]
pub struct MintRecord {
    pub id: String,
    pub transaction: B256,
    pub pair: Address,
    pub timestamp: u64,
    pub to: Address,
    pub liquidity: BigDecimal,
    pub sender: Option<Address>,
    pub amount0: Option<BigDecimal>,
    pub amount1: Option<BigDecimal>,
    pub log_index: Option<u64>,
    pub amount_usd: Option<BigDecimal>,
}

impl MintRecord {
    pub fn is_complete(&self) -> bool {
        self.sender.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BurnRecord {
    pub id: String,
    pub transaction: B256,
    pub pair: Address,
    pub timestamp: u64,
    pub liquidity: BigDecimal,
    /// Set while this record is the first half of a split burn, still
    /// waiting for the burn-to-zero transfer that finalizes it.
    pub needs_complete: bool,
    pub sender: Option<Address>,
    pub to: Option<Address>,
    pub amount0: Option<BigDecimal>,
    pub amount1: Option<BigDecimal>,
    pub log_index: Option<u64>,
    pub amount_usd: Option<BigDecimal>,
    /// Protocol fee mint folded into this burn, when one was detected.
    pub fee_to: Option<Address>,
    pub fee_liquidity: Option<BigDecimal>,
}

#[derive(Debug, Clone)]
pub struct SwapRecord {
    pub id: String,
    pub transaction: B256,
    pub pair: Address,
    pub timestamp: u64,
    pub sender: Address,
    pub from: Address,
    pub to: Address,
    pub amount0_in: BigDecimal,
    pub amount1_in: BigDecimal,
    pub amount0_out: BigDecimal,
    pub amount1_out: BigDecimal,
    pub log_index: u64,
    pub amount_usd: BigDecimal,
}

/// Transfer endpoint seen at least once. Created on first touch.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Address,
    pub usd_swapped: BigDecimal,
}

impl User {
    pub fn new(id: Address) -> Self {
        Self {
            id,
            usd_swapped: BigDecimal::zero(),
        }
    }
}

/// Running liquidity-token balance of one holder in one pool.
#[derive(Debug, Clone)]
pub struct LiquidityPosition {
    pub id: String,
    pub user: Address,
    pub pair: Address,
    pub liquidity_token_balance: BigDecimal,
}

/// Point-in-time copy of a position together with the pool pricing that
/// was current when it was taken.
#[derive(Debug, Clone)]
pub struct LiquiditySnapshot {
    pub id: String,
    pub position: String,
    pub timestamp: u64,
    pub block: u64,
    pub user: Address,
    pub pair: Address,
    pub token0_price_usd: BigDecimal,
    pub token1_price_usd: BigDecimal,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub liquidity_token_total_supply: BigDecimal,
    pub liquidity_token_balance: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct PairDayData {
    pub id: String,
    pub date: u64,
    pub pair: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub total_supply: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub daily_volume_token0: BigDecimal,
    pub daily_volume_token1: BigDecimal,
    pub daily_volume_usd: BigDecimal,
    pub daily_txns: u64,
}

#[derive(Debug, Clone)]
pub struct PairHourData {
    pub id: String,
    pub hour_start_unix: u64,
    pub pair: Address,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub hourly_volume_token0: BigDecimal,
    pub hourly_volume_token1: BigDecimal,
    pub hourly_volume_usd: BigDecimal,
    pub hourly_txns: u64,
}

#[derive(Debug, Clone)]
pub struct TokenDayData {
    pub id: String,
    pub date: u64,
    pub token: Address,
    pub price_usd: BigDecimal,
    pub daily_volume_token: BigDecimal,
    pub daily_volume_quote: BigDecimal,
    pub daily_volume_usd: BigDecimal,
    pub daily_txns: u64,
    pub total_liquidity_token: BigDecimal,
    pub total_liquidity_quote: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
}

/// Protocol-wide daily rollup, keyed by day index alone.
#[derive(Debug, Clone)]
pub struct ProtocolDayData {
    pub id: u64,
    pub date: u64,
    pub daily_volume_usd: BigDecimal,
    pub daily_volume_quote: BigDecimal,
    pub daily_volume_untracked: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
    pub total_liquidity_quote: BigDecimal,
    pub tx_count: u64,
}
