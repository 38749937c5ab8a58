use alloy::primitives::Address;
use bigdecimal::{BigDecimal, Zero};
use tidewatch_common::{EventMeta, IndexError};
use tidewatch_store::{PairDayData, PairHourData, ProtocolDayData, TokenDayData};

use crate::engine::Engine;
use crate::resolver::PairResolver;

pub const HOUR_SECONDS: u64 = 3600;
pub const DAY_SECONDS: u64 = 86400;

/// Bucket updates are idempotent per event: every call refreshes the
/// point-in-time snapshot fields and bumps the transaction counter; the
/// caller adds event-specific volume on top via the returned id.
impl<R: PairResolver> Engine<R> {
    pub(crate) fn update_pair_day_data(&mut self, meta: &EventMeta) -> Result<String, IndexError> {
        let pair = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let day_index = meta.timestamp / DAY_SECONDS;
        let id = format!("{}-{day_index}", meta.pair);

        if self.store.pair_day(&id).is_none() {
            self.store.insert_pair_day(PairDayData {
                id: id.clone(),
                date: day_index * DAY_SECONDS,
                pair: pair.id,
                token0: pair.token0,
                token1: pair.token1,
                reserve0: BigDecimal::zero(),
                reserve1: BigDecimal::zero(),
                total_supply: BigDecimal::zero(),
                reserve_usd: BigDecimal::zero(),
                daily_volume_token0: BigDecimal::zero(),
                daily_volume_token1: BigDecimal::zero(),
                daily_volume_usd: BigDecimal::zero(),
                daily_txns: 0,
            });
        }
        if let Some(day) = self.store.pair_day_mut(&id) {
            day.reserve0 = pair.reserve0;
            day.reserve1 = pair.reserve1;
            day.total_supply = pair.total_supply;
            day.reserve_usd = pair.reserve_usd;
            day.daily_txns += 1;
        }
        Ok(id)
    }

    pub(crate) fn update_pair_hour_data(&mut self, meta: &EventMeta) -> Result<String, IndexError> {
        let pair = self
            .store
            .pair(&meta.pair)
            .ok_or(IndexError::PairNotFound(meta.pair))?
            .clone();
        let hour_index = meta.timestamp / HOUR_SECONDS;
        let id = format!("{}-{hour_index}", meta.pair);

        if self.store.pair_hour(&id).is_none() {
            self.store.insert_pair_hour(PairHourData {
                id: id.clone(),
                hour_start_unix: hour_index * HOUR_SECONDS,
                pair: pair.id,
                reserve0: BigDecimal::zero(),
                reserve1: BigDecimal::zero(),
                reserve_usd: BigDecimal::zero(),
                hourly_volume_token0: BigDecimal::zero(),
                hourly_volume_token1: BigDecimal::zero(),
                hourly_volume_usd: BigDecimal::zero(),
                hourly_txns: 0,
            });
        }
        if let Some(hour) = self.store.pair_hour_mut(&id) {
            hour.reserve0 = pair.reserve0;
            hour.reserve1 = pair.reserve1;
            hour.reserve_usd = pair.reserve_usd;
            hour.hourly_txns += 1;
        }
        Ok(id)
    }

    pub(crate) fn update_token_day_data(
        &mut self,
        token_address: Address,
        meta: &EventMeta,
    ) -> Result<String, IndexError> {
        let token = self
            .store
            .token(&token_address)
            .ok_or(IndexError::TokenNotFound(token_address))?
            .clone();
        let day_index = meta.timestamp / DAY_SECONDS;
        let id = format!("{token_address}-{day_index}");
        let price_usd = &token.derived_quote * &self.bundle.quote_price_usd;
        let liquidity_quote = &token.total_liquidity * &token.derived_quote;
        let liquidity_usd = &liquidity_quote * &self.bundle.quote_price_usd;

        if self.store.token_day(&id).is_none() {
            self.store.insert_token_day(TokenDayData {
                id: id.clone(),
                date: day_index * DAY_SECONDS,
                token: token_address,
                price_usd: BigDecimal::zero(),
                daily_volume_token: BigDecimal::zero(),
                daily_volume_quote: BigDecimal::zero(),
                daily_volume_usd: BigDecimal::zero(),
                daily_txns: 0,
                total_liquidity_token: BigDecimal::zero(),
                total_liquidity_quote: BigDecimal::zero(),
                total_liquidity_usd: BigDecimal::zero(),
            });
        }
        if let Some(day) = self.store.token_day_mut(&id) {
            day.price_usd = price_usd;
            day.total_liquidity_token = token.total_liquidity;
            day.total_liquidity_quote = liquidity_quote;
            day.total_liquidity_usd = liquidity_usd;
            day.daily_txns += 1;
        }
        Ok(id)
    }

    pub(crate) fn update_protocol_day_data(&mut self, meta: &EventMeta) -> u64 {
        let day_index = meta.timestamp / DAY_SECONDS;

        if self.store.protocol_day(day_index).is_none() {
            self.store.insert_protocol_day(ProtocolDayData {
                id: day_index,
                date: day_index * DAY_SECONDS,
                daily_volume_usd: BigDecimal::zero(),
                daily_volume_quote: BigDecimal::zero(),
                daily_volume_untracked: BigDecimal::zero(),
                total_liquidity_usd: BigDecimal::zero(),
                total_liquidity_quote: BigDecimal::zero(),
                tx_count: 0,
            });
        }
        let liquidity_usd = self.protocol.total_liquidity_usd.clone();
        let liquidity_quote = self.protocol.total_liquidity_quote.clone();
        if let Some(day) = self.store.protocol_day_mut(day_index) {
            day.total_liquidity_usd = liquidity_usd;
            day.total_liquidity_quote = liquidity_quote;
            day.tx_count += 1;
        }
        day_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PricingParams;
    use crate::resolver::PairIndex;
    use alloy::primitives::B256;
    use tidewatch_store::{Pair, Token};

    fn meta_at(pair: Address, timestamp: u64) -> EventMeta {
        EventMeta {
            pair,
            block_number: 1,
            timestamp,
            tx_hash: B256::repeat_byte(0x42),
            log_index: 0,
            tx_from: Address::repeat_byte(0xfe),
        }
    }

    #[test]
    fn same_hour_shares_a_bucket() {
        let mut engine = Engine::new(PricingParams::bsc_mainnet(), PairIndex::new());
        let pair = Address::repeat_byte(0x05);
        engine.store.insert_token(Token::new(Address::repeat_byte(1), 18));
        engine.store.insert_token(Token::new(Address::repeat_byte(2), 18));
        engine.store.insert_pair(Pair::new(
            pair,
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            0,
            0,
        ));

        let first = engine.update_pair_hour_data(&meta_at(pair, 100)).unwrap();
        let second = engine.update_pair_hour_data(&meta_at(pair, 3599)).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.store.pair_hour(&first).unwrap().hourly_txns, 2);

        let third = engine.update_pair_hour_data(&meta_at(pair, 3600)).unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn day_bucket_refreshes_reserve_snapshot() {
        let mut engine = Engine::new(PricingParams::bsc_mainnet(), PairIndex::new());
        let pair_address = Address::repeat_byte(0x05);
        engine.store.insert_token(Token::new(Address::repeat_byte(1), 18));
        engine.store.insert_token(Token::new(Address::repeat_byte(2), 18));
        engine.store.insert_pair(Pair::new(
            pair_address,
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            0,
            0,
        ));

        let id = engine
            .update_pair_day_data(&meta_at(pair_address, 90_000))
            .unwrap();
        assert_eq!(engine.store.pair_day(&id).unwrap().date, 86_400);

        if let Some(pair) = engine.store.pair_mut(&pair_address) {
            pair.reserve0 = BigDecimal::from(7);
        }
        engine
            .update_pair_day_data(&meta_at(pair_address, 100_000))
            .unwrap();
        let day = engine.store.pair_day(&id).unwrap();
        assert_eq!(day.reserve0, BigDecimal::from(7));
        assert_eq!(day.daily_txns, 2);
    }

    #[test]
    fn missing_token_is_fatal() {
        let mut engine = Engine::new(PricingParams::bsc_mainnet(), PairIndex::new());
        let err = engine
            .update_token_day_data(Address::repeat_byte(9), &meta_at(Address::ZERO, 0))
            .unwrap_err();
        assert!(matches!(err, IndexError::TokenNotFound(_)));
    }
}
