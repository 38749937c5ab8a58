use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};
use tidewatch_common::{EventMeta, IndexError};
use tidewatch_math::{convert_token_to_decimal, safe_div};
use tidewatch_store::{event_id, SwapRecord};

use crate::engine::Engine;
use crate::resolver::PairResolver;

impl<R: PairResolver> Engine<R> {
    /// Reserve update. Everything priced downstream keys off this handler:
    /// it retracts the pair's previous liquidity contribution, stores the
    /// new reserves, then re-derives the quote USD price, both tokens'
    /// derived prices and the tracked reserve in that order.
    pub(crate) fn handle_sync(
        &mut self,
        meta: &EventMeta,
        reserve0: U256,
        reserve1: U256,
    ) -> Result<(), IndexError> {
        let previous = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let token0_id = previous.token0;
        let token1_id = previous.token1;
        let token0_decimals = self
            .store
            .token(&token0_id)
            .ok_or(IndexError::TokenNotFound(token0_id))?
            .decimals;
        let token1_decimals = self
            .store
            .token(&token1_id)
            .ok_or(IndexError::TokenNotFound(token1_id))?
            .decimals;

        self.protocol.total_liquidity_quote -= &previous.tracked_reserve_quote;
        if let Some(token) = self.store.token_mut(&token0_id) {
            token.total_liquidity -= &previous.reserve0;
        }
        if let Some(token) = self.store.token_mut(&token1_id) {
            token.total_liquidity -= &previous.reserve1;
        }

        let new_reserve0 = convert_token_to_decimal(reserve0, token0_decimals);
        let new_reserve1 = convert_token_to_decimal(reserve1, token1_decimals);
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.reserve0 = new_reserve0.clone();
            pair.reserve1 = new_reserve1.clone();
            pair.token0_price = safe_div(&new_reserve0, &new_reserve1);
            pair.token1_price = safe_div(&new_reserve1, &new_reserve0);
        }

        self.bundle.quote_price_usd = self.quote_price_usd();

        let derived0 = self.derived_quote_price(token0_id);
        let derived1 = self.derived_quote_price(token1_id);
        if let Some(token) = self.store.token_mut(&token0_id) {
            token.derived_quote = derived0.clone();
        }
        if let Some(token) = self.store.token_mut(&token1_id) {
            token.derived_quote = derived1.clone();
        }

        let token0 = self
            .store
            .token(&token0_id)
            .ok_or(IndexError::TokenNotFound(token0_id))?
            .clone();
        let token1 = self
            .store
            .token(&token1_id)
            .ok_or(IndexError::TokenNotFound(token1_id))?
            .clone();

        let tracked_usd =
            self.tracked_liquidity_usd(&new_reserve0, &token0, &new_reserve1, &token1);
        let tracked_quote = if self.bundle.quote_price_usd.is_zero() {
            BigDecimal::zero()
        } else {
            &tracked_usd / &self.bundle.quote_price_usd
        };

        let reserve_quote = &new_reserve0 * &derived0 + &new_reserve1 * &derived1;
        let reserve_usd = &reserve_quote * &self.bundle.quote_price_usd;
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.tracked_reserve_quote = tracked_quote.clone();
            pair.reserve_quote = reserve_quote;
            pair.reserve_usd = reserve_usd;
        }

        self.protocol.total_liquidity_quote += &tracked_quote;
        let liquidity_usd = &self.protocol.total_liquidity_quote * &self.bundle.quote_price_usd;
        self.protocol.total_liquidity_usd = liquidity_usd;

        if let Some(token) = self.store.token_mut(&token0_id) {
            token.total_liquidity += &new_reserve0;
        }
        if let Some(token) = self.store.token_mut(&token1_id) {
            token.total_liquidity += &new_reserve1;
        }
        Ok(())
    }

    /// Completes the pending mint record the reconciler opened for this
    /// transaction with the deposited amounts and their USD value.
    pub(crate) fn handle_mint(
        &mut self,
        meta: &EventMeta,
        sender: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), IndexError> {
        let mint_id = self
            .store
            .transaction(&meta.tx_hash)
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?
            .mints
            .last()
            .cloned()
            .ok_or(IndexError::PendingMintMissing(meta.tx_hash))?;
        let pair = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let token0 = self
            .store
            .token(&pair.token0)
            .ok_or(IndexError::TokenNotFound(pair.token0))?
            .clone();
        let token1 = self
            .store
            .token(&pair.token1)
            .ok_or(IndexError::TokenNotFound(pair.token1))?
            .clone();

        let amount0_dec = convert_token_to_decimal(amount0, token0.decimals);
        let amount1_dec = convert_token_to_decimal(amount1, token1.decimals);
        let amount_usd = (&token1.derived_quote * &amount1_dec
            + &token0.derived_quote * &amount0_dec)
            * &self.bundle.quote_price_usd;

        if let Some(token) = self.store.token_mut(&pair.token0) {
            token.tx_count += 1;
        }
        if let Some(token) = self.store.token_mut(&pair.token1) {
            token.tx_count += 1;
        }
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.tx_count += 1;
        }
        self.protocol.tx_count += 1;

        let mint_to = if let Some(mint) = self.store.mint_mut(&mint_id) {
            mint.sender = Some(sender);
            mint.amount0 = Some(amount0_dec);
            mint.amount1 = Some(amount1_dec);
            mint.log_index = Some(meta.log_index);
            mint.amount_usd = Some(amount_usd);
            mint.to
        } else {
            return Err(IndexError::PendingMintMissing(meta.tx_hash));
        };

        let position_id = self.upsert_position(meta.pair, mint_to);
        self.create_liquidity_snapshot(&position_id, meta);

        self.update_pair_day_data(meta)?;
        self.update_pair_hour_data(meta)?;
        self.update_protocol_day_data(meta);
        self.update_token_day_data(pair.token0, meta)?;
        self.update_token_day_data(pair.token1, meta)?;
        Ok(())
    }

    /// Completes the transaction's open burn record with the withdrawn
    /// amounts. The record itself was opened by the reconciler when the
    /// LP tokens were burned.
    pub(crate) fn handle_burn(
        &mut self,
        meta: &EventMeta,
        sender: Address,
        amount0: U256,
        amount1: U256,
        to: Address,
    ) -> Result<(), IndexError> {
        let burn_id = self
            .store
            .transaction(&meta.tx_hash)
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?
            .burns
            .last()
            .cloned()
            .ok_or(IndexError::PendingBurnMissing(meta.tx_hash))?;
        let pair = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let token0 = self
            .store
            .token(&pair.token0)
            .ok_or(IndexError::TokenNotFound(pair.token0))?
            .clone();
        let token1 = self
            .store
            .token(&pair.token1)
            .ok_or(IndexError::TokenNotFound(pair.token1))?
            .clone();

        let amount0_dec = convert_token_to_decimal(amount0, token0.decimals);
        let amount1_dec = convert_token_to_decimal(amount1, token1.decimals);
        let amount_usd = (&token1.derived_quote * &amount1_dec
            + &token0.derived_quote * &amount0_dec)
            * &self.bundle.quote_price_usd;

        if let Some(token) = self.store.token_mut(&pair.token0) {
            token.tx_count += 1;
        }
        if let Some(token) = self.store.token_mut(&pair.token1) {
            token.tx_count += 1;
        }
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.tx_count += 1;
        }
        self.protocol.tx_count += 1;

        if let Some(burn) = self.store.burn_mut(&burn_id) {
            burn.sender = Some(sender);
            burn.to = Some(to);
            burn.amount0 = Some(amount0_dec);
            burn.amount1 = Some(amount1_dec);
            burn.log_index = Some(meta.log_index);
            burn.amount_usd = Some(amount_usd);
        } else {
            return Err(IndexError::PendingBurnMissing(meta.tx_hash));
        }

        let position_id = self.upsert_position(meta.pair, sender);
        self.create_liquidity_snapshot(&position_id, meta);

        self.update_pair_day_data(meta)?;
        self.update_pair_hour_data(meta)?;
        self.update_protocol_day_data(meta);
        self.update_token_day_data(pair.token0, meta)?;
        self.update_token_day_data(pair.token1, meta)?;
        Ok(())
    }

    /// Swap accounting: volumes accrue at three trust levels (tracked USD,
    /// derived USD, raw token amounts), then fan out into the hour and day
    /// buckets returned by the aggregate updaters.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn handle_swap(
        &mut self,
        meta: &EventMeta,
        sender: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    ) -> Result<(), IndexError> {
        let pair = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let token0 = self
            .store
            .token(&pair.token0)
            .ok_or(IndexError::TokenNotFound(pair.token0))?
            .clone();
        let token1 = self
            .store
            .token(&pair.token1)
            .ok_or(IndexError::TokenNotFound(pair.token1))?
            .clone();

        let amount0_in_dec = convert_token_to_decimal(amount0_in, token0.decimals);
        let amount1_in_dec = convert_token_to_decimal(amount1_in, token1.decimals);
        let amount0_out_dec = convert_token_to_decimal(amount0_out, token0.decimals);
        let amount1_out_dec = convert_token_to_decimal(amount1_out, token1.decimals);
        let amount0_total = &amount0_in_dec + &amount0_out_dec;
        let amount1_total = &amount1_in_dec + &amount1_out_dec;

        // Untracked valuation averages both legs at their derived prices.
        let derived_amount_quote = (&token1.derived_quote * &amount1_total
            + &token0.derived_quote * &amount0_total)
            / BigDecimal::from(2);
        let derived_amount_usd = &derived_amount_quote * &self.bundle.quote_price_usd;

        let tracked_usd =
            self.tracked_volume_usd(&amount0_total, &token0, &amount1_total, &token1, &pair);
        let tracked_quote = if self.bundle.quote_price_usd.is_zero() {
            BigDecimal::zero()
        } else {
            &tracked_usd / &self.bundle.quote_price_usd
        };

        if let Some(token) = self.store.token_mut(&pair.token0) {
            token.trade_volume += &amount0_total;
            token.trade_volume_usd += &tracked_usd;
            token.untracked_volume_usd += &derived_amount_usd;
            token.tx_count += 1;
        }
        if let Some(token) = self.store.token_mut(&pair.token1) {
            token.trade_volume += &amount1_total;
            token.trade_volume_usd += &tracked_usd;
            token.untracked_volume_usd += &derived_amount_usd;
            token.tx_count += 1;
        }
        if let Some(pair) = self.store.pair_mut(&meta.pair) {
            pair.volume_token0 += &amount0_total;
            pair.volume_token1 += &amount1_total;
            pair.volume_usd += &tracked_usd;
            pair.untracked_volume_usd += &derived_amount_usd;
            pair.tx_count += 1;
        }
        self.protocol.total_volume_usd += &tracked_usd;
        self.protocol.total_volume_quote += &tracked_quote;
        self.protocol.untracked_volume_usd += &derived_amount_usd;
        self.protocol.tx_count += 1;

        self.ensure_transaction(meta);
        let swap_id = self
            .store
            .transaction(&meta.tx_hash)
            .map(|tx| event_id(&meta.tx_hash, tx.swaps.len()))
            .ok_or(IndexError::TransactionNotFound(meta.tx_hash))?;
        let amount_usd = if tracked_usd.is_zero() {
            derived_amount_usd.clone()
        } else {
            tracked_usd.clone()
        };
        self.store.insert_swap(SwapRecord {
            id: swap_id.clone(),
            transaction: meta.tx_hash,
            pair: meta.pair,
            timestamp: meta.timestamp,
            sender,
            from: meta.tx_from,
            to,
            amount0_in: amount0_in_dec,
            amount1_in: amount1_in_dec,
            amount0_out: amount0_out_dec,
            amount1_out: amount1_out_dec,
            log_index: meta.log_index,
            amount_usd,
        });
        if let Some(tx) = self.store.transaction_mut(&meta.tx_hash) {
            tx.swaps.push(swap_id);
        }

        let pair_day_id = self.update_pair_day_data(meta)?;
        let pair_hour_id = self.update_pair_hour_data(meta)?;
        let protocol_day_id = self.update_protocol_day_data(meta);
        let token0_day_id = self.update_token_day_data(pair.token0, meta)?;
        let token1_day_id = self.update_token_day_data(pair.token1, meta)?;

        if let Some(day) = self.store.pair_day_mut(&pair_day_id) {
            day.daily_volume_token0 += &amount0_total;
            day.daily_volume_token1 += &amount1_total;
            day.daily_volume_usd += &tracked_usd;
        }
        if let Some(hour) = self.store.pair_hour_mut(&pair_hour_id) {
            hour.hourly_volume_token0 += &amount0_total;
            hour.hourly_volume_token1 += &amount1_total;
            hour.hourly_volume_usd += &tracked_usd;
        }
        if let Some(day) = self.store.protocol_day_mut(protocol_day_id) {
            day.daily_volume_usd += &tracked_usd;
            day.daily_volume_quote += &tracked_quote;
            day.daily_volume_untracked += &derived_amount_usd;
        }

        // Each token's day bucket is priced at that token's own derived
        // price, not the pooled swap valuation.
        let volume0_quote = &amount0_total * &token0.derived_quote;
        let volume0_usd = &volume0_quote * &self.bundle.quote_price_usd;
        if let Some(day) = self.store.token_day_mut(&token0_day_id) {
            day.daily_volume_token += &amount0_total;
            day.daily_volume_quote += &volume0_quote;
            day.daily_volume_usd += &volume0_usd;
        }
        let volume1_quote = &amount1_total * &token1.derived_quote;
        let volume1_usd = &volume1_quote * &self.bundle.quote_price_usd;
        if let Some(day) = self.store.token_day_mut(&token1_day_id) {
            day.daily_volume_token += &amount1_total;
            day.daily_volume_quote += &volume1_quote;
            day.daily_volume_usd += &volume1_usd;
        }
        Ok(())
    }
}
