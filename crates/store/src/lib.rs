use alloy::primitives::{Address, B256};
use hashbrown::HashMap;

mod entities;

pub use entities::*;

/// Composite id for logical events and bucket records: `<parent>-<index>`.
pub fn event_id(tx_hash: &B256, index: usize) -> String {
    format!("{tx_hash}-{index}")
}

/// Keyed entity store. Single writer per event: a handler owns the store
/// from its first load to its last save, and every lookup returns an
/// explicit present/absent result.
#[derive(Debug, Default)]
pub struct Store {
    tokens: HashMap<Address, Token>,
    pairs: HashMap<Address, Pair>,
    transactions: HashMap<B256, Transaction>,
    mints: HashMap<String, MintRecord>,
    burns: HashMap<String, BurnRecord>,
    swaps: HashMap<String, SwapRecord>,
    users: HashMap<Address, User>,
    positions: HashMap<String, LiquidityPosition>,
    snapshots: HashMap<String, LiquiditySnapshot>,
    pair_day: HashMap<String, PairDayData>,
    pair_hour: HashMap<String, PairHourData>,
    token_day: HashMap<String, TokenDayData>,
    protocol_day: HashMap<u64, ProtocolDayData>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self, id: &Address) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn token_mut(&mut self, id: &Address) -> Option<&mut Token> {
        self.tokens.get_mut(id)
    }

    pub fn insert_token(&mut self, token: Token) {
        self.tokens.insert(token.id, token);
    }

    pub fn pair(&self, id: &Address) -> Option<&Pair> {
        self.pairs.get(id)
    }

    pub fn pair_mut(&mut self, id: &Address) -> Option<&mut Pair> {
        self.pairs.get_mut(id)
    }

    pub fn insert_pair(&mut self, pair: Pair) {
        self.pairs.insert(pair.id, pair);
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn transaction(&self, id: &B256) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn transaction_mut(&mut self, id: &B256) -> Option<&mut Transaction> {
        self.transactions.get_mut(id)
    }

    pub fn insert_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(transaction.id, transaction);
    }

    pub fn mint(&self, id: &str) -> Option<&MintRecord> {
        self.mints.get(id)
    }

    pub fn mint_mut(&mut self, id: &str) -> Option<&mut MintRecord> {
        self.mints.get_mut(id)
    }

    pub fn insert_mint(&mut self, mint: MintRecord) {
        self.mints.insert(mint.id.clone(), mint);
    }

    pub fn remove_mint(&mut self, id: &str) -> Option<MintRecord> {
        self.mints.remove(id)
    }

    pub fn burn(&self, id: &str) -> Option<&BurnRecord> {
        self.burns.get(id)
    }

    pub fn burn_mut(&mut self, id: &str) -> Option<&mut BurnRecord> {
        self.burns.get_mut(id)
    }

    pub fn insert_burn(&mut self, burn: BurnRecord) {
        self.burns.insert(burn.id.clone(), burn);
    }

    pub fn swap(&self, id: &str) -> Option<&SwapRecord> {
        self.swaps.get(id)
    }

    pub fn insert_swap(&mut self, swap: SwapRecord) {
        self.swaps.insert(swap.id.clone(), swap);
    }

    pub fn user(&self, id: &Address) -> Option<&User> {
        self.users.get(id)
    }

    pub fn user_mut(&mut self, id: &Address) -> Option<&mut User> {
        self.users.get_mut(id)
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn position(&self, id: &str) -> Option<&LiquidityPosition> {
        self.positions.get(id)
    }

    pub fn position_mut(&mut self, id: &str) -> Option<&mut LiquidityPosition> {
        self.positions.get_mut(id)
    }

    pub fn insert_position(&mut self, position: LiquidityPosition) {
        self.positions.insert(position.id.clone(), position);
    }

    pub fn snapshot(&self, id: &str) -> Option<&LiquiditySnapshot> {
        self.snapshots.get(id)
    }

    pub fn insert_snapshot(&mut self, snapshot: LiquiditySnapshot) {
        self.snapshots.insert(snapshot.id.clone(), snapshot);
    }

    pub fn pair_day(&self, id: &str) -> Option<&PairDayData> {
        self.pair_day.get(id)
    }

    pub fn pair_day_mut(&mut self, id: &str) -> Option<&mut PairDayData> {
        self.pair_day.get_mut(id)
    }

    pub fn insert_pair_day(&mut self, data: PairDayData) {
        self.pair_day.insert(data.id.clone(), data);
    }

    pub fn pair_hour(&self, id: &str) -> Option<&PairHourData> {
        self.pair_hour.get(id)
    }

    pub fn pair_hour_mut(&mut self, id: &str) -> Option<&mut PairHourData> {
        self.pair_hour.get_mut(id)
    }

    pub fn insert_pair_hour(&mut self, data: PairHourData) {
        self.pair_hour.insert(data.id.clone(), data);
    }

    pub fn token_day(&self, id: &str) -> Option<&TokenDayData> {
        self.token_day.get(id)
    }

    pub fn token_day_mut(&mut self, id: &str) -> Option<&mut TokenDayData> {
        self.token_day.get_mut(id)
    }

    pub fn insert_token_day(&mut self, data: TokenDayData) {
        self.token_day.insert(data.id.clone(), data);
    }

    pub fn protocol_day(&self, id: u64) -> Option<&ProtocolDayData> {
        self.protocol_day.get(&id)
    }

    pub fn protocol_day_mut(&mut self, id: u64) -> Option<&mut ProtocolDayData> {
        self.protocol_day.get_mut(&id)
    }

    pub fn insert_protocol_day(&mut self, data: ProtocolDayData) {
        self.protocol_day.insert(data.id, data);
    }
}
