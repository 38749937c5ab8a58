use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};
use tidewatch_common::{EventMeta, IndexError};
use tidewatch_math::{convert_token_to_decimal, LP_TOKEN_DECIMALS};
use tidewatch_store::{
    event_id, BurnRecord, LiquidityPosition, LiquiditySnapshot, MintRecord, User,
};

use crate::engine::Engine;
use crate::resolver::PairResolver;

/// Raw amount of the liquidity locked forever on a pool's first mint.
const MINIMUM_LIQUIDITY: u64 = 1000;

impl<R: PairResolver> Engine<R> {
    /// Reconstructs logical mint/burn records from raw LP-token transfers.
    /// A mint arrives as a transfer from the zero address, a burn as a
    /// transfer to it, and a split burn routes the tokens through the pair
    /// contract first. The later Mint/Burn events complete these records.
    pub(crate) fn handle_transfer(
        &mut self,
        meta: &EventMeta,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), IndexError> {
        // The permanently locked first-mint dust never reaches a holder.
        if to == Address::ZERO && value == U256::from(MINIMUM_LIQUIDITY) {
            return Ok(());
        }

        let pair_address = meta.pair;
        if self.store.pair(&pair_address).is_none() {
            return Err(IndexError::PairNotFound(pair_address));
        }
        self.ensure_user(from);
        self.ensure_user(to);
        let value_dec = convert_token_to_decimal(value, LP_TOKEN_DECIMALS);
        self.ensure_transaction(meta);

        if from == Address::ZERO {
            self.open_mint(meta, to, &value_dec)?;
        } else if to == pair_address {
            self.open_split_burn(meta, from, to, &value_dec)?;
        }

        if to == Address::ZERO && from == pair_address {
            self.close_burn(meta, from, to, &value_dec)?;
        }

        // Snapshots are taken only on holder-to-holder movements; mint,
        // burn and split-burn legs have the zero address or the pair on
        // one end and are captured by the completing event instead.
        let from_external = from != Address::ZERO && from != pair_address;
        let to_external = to != Address::ZERO && to != pair_address;

        if from_external {
            let position_id = self.upsert_position(pair_address, from);
            if let Some(position) = self.store.position_mut(&position_id) {
                position.liquidity_token_balance -= &value_dec;
            }
            if to_external {
                self.create_liquidity_snapshot(&position_id, meta);
            }
        }

        if to_external {
            let position_id = self.upsert_position(pair_address, to);
            if let Some(position) = self.store.position_mut(&position_id) {
                position.liquidity_token_balance += &value_dec;
            }
            if from_external {
                self.create_liquidity_snapshot(&position_id, meta);
            }
        }

        Ok(())
    }

    /// Records a pending mint, unless the transaction's last mint is still
    /// open. A second mint transfer while one is pending belongs to the
    /// same logical mint (the protocol fee), folded at burn time instead.
    fn open_mint(
        &mut self,
        meta: &EventMeta,
        to: Address,
        value: &BigDecimal,
    ) -> Result<(), IndexError> {
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.total_supply += value;
        }

        let tx = self
            .store
            .transaction(&meta.tx_hash)
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?;
        let mints_len = tx.mints.len();
        let last_open = match tx.mints.last() {
            Some(id) => !self
                .store
                .mint(id)
                .ok_or(IndexError::PendingMintMissing(meta.tx_hash))?
                .is_complete(),
            None => false,
        };
        if last_open {
            return Ok(());
        }

        let id = event_id(&meta.tx_hash, mints_len);
        self.store.insert_mint(MintRecord {
            id: id.clone(),
            transaction: meta.tx_hash,
            pair: meta.pair,
            timestamp: meta.timestamp,
            to,
            liquidity: value.clone(),
            sender: None,
            amount0: None,
            amount1: None,
            log_index: None,
            amount_usd: None,
        });
        if let Some(tx) = self.store.transaction_mut(&meta.tx_hash) {
            tx.mints.push(id);
        }
        Ok(())
    }

    /// First half of a split burn: the holder sends LP tokens to the pair
    /// contract, which will burn them in a later transfer.
    fn open_split_burn(
        &mut self,
        meta: &EventMeta,
        from: Address,
        to: Address,
        value: &BigDecimal,
    ) -> Result<(), IndexError> {
        let tx = self
            .store
            .transaction(&meta.tx_hash)
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?;
        let id = event_id(&meta.tx_hash, tx.burns.len());
        self.store.insert_burn(BurnRecord {
            id: id.clone(),
            transaction: meta.tx_hash,
            pair: meta.pair,
            timestamp: meta.timestamp,
            liquidity: value.clone(),
            needs_complete: true,
            sender: Some(from),
            to: Some(to),
            amount0: None,
            amount1: None,
            log_index: None,
            amount_usd: None,
            fee_to: None,
            fee_liquidity: None,
        });
        if let Some(tx) = self.store.transaction_mut(&meta.tx_hash) {
            tx.burns.push(id);
        }
        Ok(())
    }

    /// Burn-to-zero transfer. Reuses the transaction's open split burn if
    /// one exists, otherwise opens a fresh record, then folds a still-open
    /// mint into the burn as the protocol fee.
    fn close_burn(
        &mut self,
        meta: &EventMeta,
        from: Address,
        to: Address,
        value: &BigDecimal,
    ) -> Result<(), IndexError> {
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.total_supply -= value;
        }

        let tx = self
            .store
            .transaction(&meta.tx_hash)
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?;
        let burns_len = tx.burns.len();
        let pending = tx
            .burns
            .last()
            .cloned()
            .filter(|id| self.store.burn(id).is_some_and(|b| b.needs_complete));

        let (burn_id, reused) = match pending {
            Some(id) => {
                if let Some(burn) = self.store.burn_mut(&id) {
                    burn.needs_complete = false;
                }
                (id, true)
            }
            None => {
                let id = event_id(&meta.tx_hash, burns_len);
                self.store.insert_burn(BurnRecord {
                    id: id.clone(),
                    transaction: meta.tx_hash,
                    pair: meta.pair,
                    timestamp: meta.timestamp,
                    liquidity: value.clone(),
                    needs_complete: false,
                    sender: Some(from),
                    to: Some(to),
                    amount0: None,
                    amount1: None,
                    log_index: None,
                    amount_usd: None,
                    fee_to: None,
                    fee_liquidity: None,
                });
                (id, false)
            }
        };

        // An open mint at this point was the protocol fee mint, not a
        // deposit. It collapses into the burn record.
        let open_mint = self
            .store
            .transaction(&meta.tx_hash)
            .and_then(|tx| tx.mints.last().cloned())
            .filter(|id| self.store.mint(id).is_some_and(|m| !m.is_complete()));
        if let Some(mint_id) = open_mint {
            if let Some(mint) = self.store.remove_mint(&mint_id) {
                if let Some(burn) = self.store.burn_mut(&burn_id) {
                    burn.fee_to = Some(mint.to);
                    burn.fee_liquidity = Some(mint.liquidity);
                }
            }
            if let Some(tx) = self.store.transaction_mut(&meta.tx_hash) {
                tx.mints.pop();
            }
        }

        if let Some(tx) = self.store.transaction_mut(&meta.tx_hash) {
            if reused {
                if let Some(slot) = tx.burns.last_mut() {
                    *slot = burn_id;
                }
            } else {
                tx.burns.push(burn_id);
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_user(&mut self, address: Address) {
        if self.store.user(&address).is_none() {
            self.store.insert_user(User::new(address));
        }
    }

    /// Position id is `<pair>-<user>`; the first touch of a position counts
    /// the user as a new liquidity provider.
    pub(crate) fn upsert_position(&mut self, pair: Address, user: Address) -> String {
        let id = format!("{pair}-{user}");
        if self.store.position(&id).is_none() {
            if let Some(pair_entity) = self.store.pair_mut(&pair) {
                pair_entity.liquidity_provider_count += 1;
            }
            self.store.insert_position(LiquidityPosition {
                id: id.clone(),
                user,
                pair,
                liquidity_token_balance: BigDecimal::zero(),
            });
        }
        id
    }

    pub(crate) fn create_liquidity_snapshot(&mut self, position_id: &str, meta: &EventMeta) {
        let Some(position) = self.store.position(position_id) else {
            return;
        };
        let Some(pair) = self.store.pair(&position.pair) else {
            return;
        };
        let (Some(token0), Some(token1)) = (
            self.store.token(&pair.token0),
            self.store.token(&pair.token1),
        ) else {
            return;
        };

        let snapshot = LiquiditySnapshot {
            id: format!("{position_id}-{}", meta.timestamp),
            position: position_id.to_string(),
            timestamp: meta.timestamp,
            block: meta.block_number,
            user: position.user,
            pair: pair.id,
            token0_price_usd: &token0.derived_quote * &self.bundle.quote_price_usd,
            token1_price_usd: &token1.derived_quote * &self.bundle.quote_price_usd,
            reserve0: pair.reserve0.clone(),
            reserve1: pair.reserve1.clone(),
            reserve_usd: pair.reserve_usd.clone(),
            liquidity_token_total_supply: pair.total_supply.clone(),
            liquidity_token_balance: position.liquidity_token_balance.clone(),
        };
        self.store.insert_snapshot(snapshot);
    }
}
