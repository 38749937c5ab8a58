use alloy::primitives::Address;
use hashbrown::HashMap;

/// Read-only pair-address resolution: the pool the factory created for a
/// token pair, if any. Synchronous by design; the engine never suspends
/// mid-handler.
pub trait PairResolver {
    fn pair_for(&self, a: Address, b: Address) -> Option<Address>;
}

/// In-memory resolver backed by observed PairCreated events. Keys are
/// sorted so lookups are order-independent.
#[derive(Debug, Default)]
pub struct PairIndex {
    pairs: HashMap<(Address, Address), Address>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_from_tokens(a: Address, b: Address) -> (Address, Address) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn insert(&mut self, token0: Address, token1: Address, pair: Address) {
        self.pairs
            .insert(Self::key_from_tokens(token0, token1), pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PairResolver for PairIndex {
    fn pair_for(&self, a: Address, b: Address) -> Option<Address> {
        self.pairs.get(&Self::key_from_tokens(a, b)).copied()
    }
}
