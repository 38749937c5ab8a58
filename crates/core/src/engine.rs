use alloy::primitives::Address;
use tidewatch_common::{EventMeta, IndexError, PairEvent};
use tidewatch_math::DEFAULT_DECIMALS;
use tidewatch_store::{Pair, Store, Token, Transaction};

use crate::context::{Bundle, ProtocolTotals};
use crate::params::PricingParams;
use crate::resolver::PairResolver;

/// Single-threaded event engine. One event is handled to completion before
/// the next begins; the engine owns the store and the protocol-wide
/// context (bundle, factory totals) for the duration of each handler.
pub struct Engine<R> {
    pub store: Store,
    pub bundle: Bundle,
    pub protocol: ProtocolTotals,
    pub params: PricingParams,
    resolver: R,
}

impl<R: PairResolver> Engine<R> {
    pub fn new(params: PricingParams, resolver: R) -> Self {
        Self {
            store: Store::new(),
            bundle: Bundle::default(),
            protocol: ProtocolTotals::default(),
            params,
            resolver,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub(crate) fn resolve_pair(&self, a: Address, b: Address) -> Option<Address> {
        self.resolver.pair_for(a, b)
    }

    /// Registers a newly created pool and its tokens. Tokens are created
    /// on first reference; a token declaring no decimals falls back to the
    /// fixed default.
    pub fn create_pair(
        &mut self,
        pair: Address,
        token0: Address,
        token0_decimals: u32,
        token1: Address,
        token1_decimals: u32,
        timestamp: u64,
        block: u64,
    ) {
        if self.store.pair(&pair).is_some() {
            return;
        }

        if self.store.token(&token0).is_none() {
            let decimals = if token0_decimals == 0 {
                DEFAULT_DECIMALS
            } else {
                token0_decimals
            };
            self.store.insert_token(Token::new(token0, decimals));
        }
        if self.store.token(&token1).is_none() {
            let decimals = if token1_decimals == 0 {
                DEFAULT_DECIMALS
            } else {
                token1_decimals
            };
            self.store.insert_token(Token::new(token1, decimals));
        }

        self.store
            .insert_pair(Pair::new(pair, token0, token1, timestamp, block));
        self.protocol.pair_count += 1;
        tracing::info!("new pair {pair} ({token0} / {token1})");
    }

    /// Dispatches one event. Events must arrive in (block, log index)
    /// order; any `IndexError` is fatal and must halt the pipeline.
    pub fn handle_event(&mut self, meta: &EventMeta, event: PairEvent) -> Result<(), IndexError> {
        match event {
            PairEvent::Transfer { from, to, value } => self.handle_transfer(meta, from, to, value),
            PairEvent::Sync { reserve0, reserve1 } => self.handle_sync(meta, reserve0, reserve1),
            PairEvent::Mint {
                sender,
                amount0,
                amount1,
            } => self.handle_mint(meta, sender, amount0, amount1),
            PairEvent::Burn {
                sender,
                amount0,
                amount1,
                to,
            } => self.handle_burn(meta, sender, amount0, amount1, to),
            PairEvent::Swap {
                sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to,
            } => self.handle_swap(
                meta,
                sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to,
            ),
        }
    }

    pub(crate) fn ensure_transaction(&mut self, meta: &EventMeta) {
        if self.store.transaction(&meta.tx_hash).is_none() {
            self.store.insert_transaction(Transaction::new(
                meta.tx_hash,
                meta.block_number,
                meta.timestamp,
            ));
        }
    }
}
