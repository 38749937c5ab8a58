use alloy::primitives::{Address, B256, U256};

/// Context shared by every decoded pair event: the emitting pool plus the
/// chain coordinates the host resolved for the log.
#[derive(Debug, Clone)]
pub struct EventMeta {
    pub pair: Address,
    pub block_number: u64,
    pub timestamp: u64,
    pub tx_hash: B256,
    pub log_index: u64,
    pub tx_from: Address,
}

/// Decoded pair-contract events, delivered in (block, log index) order.
/// Amounts are raw integers at native token decimals.
#[derive(Debug, Clone)]
pub enum PairEvent {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Sync {
        reserve0: U256,
        reserve1: U256,
    },
    Mint {
        sender: Address,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    },
    Swap {
        sender: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    },
}

/// Ordering-violation taxonomy. Every variant is fatal: a handler that hits
/// one found the store in a state the event stream should have made
/// impossible, and continuing would corrupt downstream aggregates.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("pair {0} received an event before its PairCreated")]
    PairNotFound(Address),
    #[error("token {0} missing from the store")]
    TokenNotFound(Address),
    #[error("transaction {0} missing while completing an event")]
    TransactionNotFound(B256),
    #[error("no pending mint to complete in transaction {0}")]
    PendingMintMissing(B256),
    #[error("no pending burn to complete in transaction {0}")]
    PendingBurnMissing(B256),
}
