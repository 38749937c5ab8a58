use alloy::primitives::{Address, B256, U256};
use bigdecimal::{BigDecimal, Zero};
use tidewatch_common::{EventMeta, IndexError, PairEvent};
use tidewatch_core::{Engine, PairIndex, PricingParams, SeedPair};

const TOKEN: Address = Address::repeat_byte(0x11);
const QUOTE: Address = Address::repeat_byte(0x22);
const STABLE: Address = Address::repeat_byte(0x33);
const SEED_POOL: Address = Address::repeat_byte(0x44);
const POOL: Address = Address::repeat_byte(0x55);
const USER: Address = Address::repeat_byte(0x66);
const FEE_TO: Address = Address::repeat_byte(0x77);

fn wei(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18))
}

fn meta(pair: Address, tx_hash: B256, timestamp: u64) -> EventMeta {
    EventMeta {
        pair,
        block_number: 1000,
        timestamp,
        tx_hash,
        log_index: 0,
        tx_from: USER,
    }
}

fn params() -> PricingParams {
    PricingParams {
        quote_token: QUOTE,
        seed_pairs: vec![SeedPair {
            pair: SEED_POOL,
            stable_is_token0: true,
        }],
        whitelist: vec![QUOTE],
        minimum_tracked_reserve_usd: BigDecimal::from(400_000),
        minimum_quote_liquidity: BigDecimal::from(2),
    }
}

/// Quote asset priced at 300 USD through the seed pool; the main pool
/// holds 8000 TOKEN against 2000 QUOTE, so TOKEN derives to 0.25 quote.
fn engine_with_priced_pool() -> Engine<PairIndex> {
    let mut engine = Engine::new(params(), PairIndex::new());

    engine.create_pair(SEED_POOL, STABLE, 18, QUOTE, 18, 1_000_000, 900);
    engine.resolver_mut().insert(STABLE, QUOTE, SEED_POOL);
    engine
        .handle_event(
            &meta(SEED_POOL, B256::repeat_byte(0x01), 1_000_000),
            PairEvent::Sync {
                reserve0: wei(600_000),
                reserve1: wei(2_000),
            },
        )
        .unwrap();

    engine.create_pair(POOL, TOKEN, 18, QUOTE, 18, 1_000_000, 901);
    engine.resolver_mut().insert(TOKEN, QUOTE, POOL);
    // Twice: the first sync establishes the pool's quote reserve, the
    // second can then derive TOKEN's price through it.
    for hash in [0x02u8, 0x03] {
        engine
            .handle_event(
                &meta(POOL, B256::repeat_byte(hash), 1_000_000),
                PairEvent::Sync {
                    reserve0: wei(8_000),
                    reserve1: wei(2_000),
                },
            )
            .unwrap();
    }
    engine
}

#[test]
fn sync_prices_quote_and_derives_token() {
    let engine = engine_with_priced_pool();
    assert_eq!(engine.bundle.quote_price_usd, BigDecimal::from(300));

    let token = engine.store.token(&TOKEN).unwrap();
    assert_eq!(
        token.derived_quote,
        BigDecimal::from(25) / BigDecimal::from(100)
    );

    let pair = engine.store.pair(&POOL).unwrap();
    // 8000 * 0.25 + 2000 * 1
    assert_eq!(pair.reserve_quote, BigDecimal::from(4_000));
    assert_eq!(pair.reserve_usd, BigDecimal::from(1_200_000));
}

#[test]
fn sync_retracts_previous_liquidity_contribution() {
    let mut engine = engine_with_priced_pool();
    let before = engine.protocol.total_liquidity_quote.clone();

    engine
        .handle_event(
            &meta(POOL, B256::repeat_byte(0x04), 1_000_100),
            PairEvent::Sync {
                reserve0: wei(8_000),
                reserve1: wei(2_000),
            },
        )
        .unwrap();

    // Identical reserves resync to the same total, not double it.
    assert_eq!(engine.protocol.total_liquidity_quote, before);
    let token = engine.store.token(&QUOTE).unwrap();
    assert_eq!(token.total_liquidity, BigDecimal::from(4_000));
}

#[test]
fn mint_flow_completes_pending_record() {
    let mut engine = engine_with_priced_pool();
    let hash = B256::repeat_byte(0xa1);
    let event_meta = meta(POOL, hash, 1_000_200);

    engine
        .handle_event(
            &event_meta,
            PairEvent::Transfer {
                from: Address::ZERO,
                to: USER,
                value: wei(10),
            },
        )
        .unwrap();

    // Pending until the Mint event lands.
    {
        let tx = engine.store.transaction(&hash).unwrap();
        assert_eq!(tx.mints.len(), 1);
        assert!(!engine.store.mint(&tx.mints[0]).unwrap().is_complete());
    }

    engine
        .handle_event(
            &event_meta,
            PairEvent::Mint {
                sender: USER,
                amount0: wei(80),
                amount1: wei(20),
            },
        )
        .unwrap();

    let tx = engine.store.transaction(&hash).unwrap();
    let mint = engine.store.mint(&tx.mints[0]).unwrap();
    assert!(mint.is_complete());
    assert_eq!(mint.to, USER);
    assert_eq!(mint.amount0, Some(BigDecimal::from(80)));
    assert_eq!(mint.amount1, Some(BigDecimal::from(20)));
    // (20 * 1 + 80 * 0.25) * 300
    assert_eq!(mint.amount_usd, Some(BigDecimal::from(12_000)));

    let pair = engine.store.pair(&POOL).unwrap();
    assert_eq!(pair.total_supply, BigDecimal::from(10));
    assert_eq!(pair.tx_count, 1);
    assert_eq!(pair.liquidity_provider_count, 1);

    let position = engine.store.position(&format!("{POOL}-{USER}")).unwrap();
    assert_eq!(position.liquidity_token_balance, BigDecimal::from(10));
}

#[test]
fn initial_liquidity_lock_is_ignored() {
    let mut engine = engine_with_priced_pool();
    let hash = B256::repeat_byte(0xa2);

    engine
        .handle_event(
            &meta(POOL, hash, 1_000_200),
            PairEvent::Transfer {
                from: Address::ZERO,
                to: Address::ZERO,
                value: U256::from(1000),
            },
        )
        .unwrap();

    assert!(engine.store.transaction(&hash).is_none());
    assert!(engine.store.pair(&POOL).unwrap().total_supply.is_zero());
}

#[test]
fn split_burn_folds_fee_mint() {
    let mut engine = engine_with_priced_pool();
    let hash = B256::repeat_byte(0xb1);
    let event_meta = meta(POOL, hash, 1_000_300);

    // Holder routes LP tokens through the pair, the pair mints the
    // protocol fee, then burns the holder's tokens.
    engine
        .handle_event(
            &event_meta,
            PairEvent::Transfer {
                from: USER,
                to: POOL,
                value: wei(5),
            },
        )
        .unwrap();
    engine
        .handle_event(
            &event_meta,
            PairEvent::Transfer {
                from: Address::ZERO,
                to: FEE_TO,
                value: wei(1),
            },
        )
        .unwrap();
    engine
        .handle_event(
            &event_meta,
            PairEvent::Transfer {
                from: POOL,
                to: Address::ZERO,
                value: wei(5),
            },
        )
        .unwrap();
    engine
        .handle_event(
            &event_meta,
            PairEvent::Burn {
                sender: USER,
                amount0: wei(40),
                amount1: wei(10),
                to: USER,
            },
        )
        .unwrap();

    let tx = engine.store.transaction(&hash).unwrap();
    assert!(tx.mints.is_empty(), "fee mint folds into the burn");
    assert_eq!(tx.burns.len(), 1);

    let burn = engine.store.burn(&tx.burns[0]).unwrap();
    assert!(!burn.needs_complete);
    assert_eq!(burn.sender, Some(USER));
    assert_eq!(burn.to, Some(USER));
    assert_eq!(burn.liquidity, BigDecimal::from(5));
    assert_eq!(burn.amount0, Some(BigDecimal::from(40)));
    assert_eq!(burn.amount1, Some(BigDecimal::from(10)));
    assert_eq!(burn.fee_to, Some(FEE_TO));
    assert_eq!(burn.fee_liquidity, Some(BigDecimal::from(1)));

    // Fee mint record is gone from the store entirely.
    assert!(engine.store.mint(&format!("{hash}-0")).is_none());

    // Supply: +1 fee mint, -5 burn.
    assert_eq!(
        engine.store.pair(&POOL).unwrap().total_supply,
        BigDecimal::from(-4)
    );
}

#[test]
fn burn_without_split_transfer_still_completes() {
    let mut engine = engine_with_priced_pool();
    let hash = B256::repeat_byte(0xb2);
    let event_meta = meta(POOL, hash, 1_000_300);

    engine
        .handle_event(
            &event_meta,
            PairEvent::Transfer {
                from: POOL,
                to: Address::ZERO,
                value: wei(3),
            },
        )
        .unwrap();
    engine
        .handle_event(
            &event_meta,
            PairEvent::Burn {
                sender: USER,
                amount0: wei(24),
                amount1: wei(6),
                to: USER,
            },
        )
        .unwrap();

    let tx = engine.store.transaction(&hash).unwrap();
    assert_eq!(tx.burns.len(), 1);
    let burn = engine.store.burn(&tx.burns[0]).unwrap();
    assert_eq!(burn.sender, Some(USER));
    assert_eq!(burn.amount0, Some(BigDecimal::from(24)));
}

#[test]
fn snapshot_requires_both_endpoints_external() {
    let mut engine = engine_with_priced_pool();
    let other_holder = Address::repeat_byte(0xab);

    // Split-burn first leg: one end is the pair, no snapshot.
    engine
        .handle_event(
            &meta(POOL, B256::repeat_byte(0xe1), 1_000_600),
            PairEvent::Transfer {
                from: USER,
                to: POOL,
                value: wei(5),
            },
        )
        .unwrap();
    assert!(engine
        .store
        .snapshot(&format!("{POOL}-{USER}-1000600"))
        .is_none());
    // The position itself is still adjusted.
    let position = engine.store.position(&format!("{POOL}-{USER}")).unwrap();
    assert_eq!(position.liquidity_token_balance, BigDecimal::from(-5));

    // Mint leg: one end is the zero address, no snapshot either.
    engine
        .handle_event(
            &meta(POOL, B256::repeat_byte(0xe2), 1_000_650),
            PairEvent::Transfer {
                from: Address::ZERO,
                to: USER,
                value: wei(5),
            },
        )
        .unwrap();
    assert!(engine
        .store
        .snapshot(&format!("{POOL}-{USER}-1000650"))
        .is_none());

    // Holder-to-holder movement snapshots both sides.
    engine
        .handle_event(
            &meta(POOL, B256::repeat_byte(0xe3), 1_000_700),
            PairEvent::Transfer {
                from: USER,
                to: other_holder,
                value: wei(2),
            },
        )
        .unwrap();
    assert!(engine
        .store
        .snapshot(&format!("{POOL}-{USER}-1000700"))
        .is_some());
    assert!(engine
        .store
        .snapshot(&format!("{POOL}-{other_holder}-1000700"))
        .is_some());
}

#[test]
fn transfer_endpoints_are_recorded_as_users() {
    let mut engine = engine_with_priced_pool();
    assert!(engine.store.user(&USER).is_none());

    engine
        .handle_event(
            &meta(POOL, B256::repeat_byte(0xe4), 1_000_900),
            PairEvent::Transfer {
                from: Address::ZERO,
                to: USER,
                value: wei(1),
            },
        )
        .unwrap();

    let user = engine.store.user(&USER).unwrap();
    assert!(user.usd_swapped.is_zero());
}

#[test]
fn swap_on_deep_whitelisted_pool_is_tracked() {
    let mut engine = engine_with_priced_pool();
    let hash = B256::repeat_byte(0xc1);

    engine
        .handle_event(
            &meta(POOL, hash, 1_000_400),
            PairEvent::Swap {
                sender: USER,
                amount0_in: wei(100),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: wei(24),
                to: USER,
            },
        )
        .unwrap();

    // Only the quote side is whitelisted: 24 quote at 300 USD.
    let tx = engine.store.transaction(&hash).unwrap();
    let swap = engine.store.swap(&tx.swaps[0]).unwrap();
    assert_eq!(swap.amount_usd, BigDecimal::from(7_200));
    assert_eq!(swap.from, USER);

    let pair = engine.store.pair(&POOL).unwrap();
    assert_eq!(pair.volume_usd, BigDecimal::from(7_200));
    assert_eq!(pair.volume_token0, BigDecimal::from(100));
    assert_eq!(pair.volume_token1, BigDecimal::from(24));

    assert_eq!(engine.protocol.total_volume_usd, BigDecimal::from(7_200));
    assert_eq!(engine.protocol.total_volume_quote, BigDecimal::from(24));
    assert_eq!(engine.protocol.tx_count, 1);

    let day_index = 1_000_400 / 86_400;
    let protocol_day = engine.store.protocol_day(day_index).unwrap();
    assert_eq!(protocol_day.daily_volume_usd, BigDecimal::from(7_200));
    assert_eq!(protocol_day.tx_count, 1);

    let hour_index = 1_000_400 / 3_600;
    let pair_hour = engine
        .store
        .pair_hour(&format!("{POOL}-{hour_index}"))
        .unwrap();
    assert_eq!(pair_hour.hourly_volume_usd, BigDecimal::from(7_200));
    assert_eq!(pair_hour.hourly_txns, 1);

    // Token day buckets price each leg at its own derived price.
    let token_day = engine
        .store
        .token_day(&format!("{TOKEN}-{day_index}"))
        .unwrap();
    assert_eq!(token_day.daily_volume_token, BigDecimal::from(100));
    // 100 * 0.25 * 300
    assert_eq!(token_day.daily_volume_usd, BigDecimal::from(7_500));

    let quote_day = engine
        .store
        .token_day(&format!("{QUOTE}-{day_index}"))
        .unwrap();
    assert_eq!(quote_day.daily_volume_usd, BigDecimal::from(7_200));
}

#[test]
fn swap_on_unlisted_pool_is_untracked() {
    let mut engine = engine_with_priced_pool();
    let other = Address::repeat_byte(0x88);
    let other_pool = Address::repeat_byte(0x99);
    engine.create_pair(other_pool, TOKEN, 18, other, 18, 1_000_000, 902);
    engine.resolver_mut().insert(TOKEN, other, other_pool);

    let hash = B256::repeat_byte(0xc2);
    engine
        .handle_event(
            &meta(other_pool, hash, 1_000_400),
            PairEvent::Swap {
                sender: USER,
                amount0_in: wei(8),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: wei(100),
                to: USER,
            },
        )
        .unwrap();

    let pair = engine.store.pair(&other_pool).unwrap();
    assert!(pair.volume_usd.is_zero());
    // Swap record falls back to the derived valuation:
    // (8 * 0.25 + 100 * 0) / 2 * 300
    let tx = engine.store.transaction(&hash).unwrap();
    let swap = engine.store.swap(&tx.swaps[0]).unwrap();
    assert_eq!(swap.amount_usd, BigDecimal::from(300));
    assert_eq!(pair.untracked_volume_usd, BigDecimal::from(300));
}

#[test]
fn out_of_order_events_are_fatal() {
    let mut engine = engine_with_priced_pool();
    let event_meta = meta(POOL, B256::repeat_byte(0xd1), 1_000_500);

    // Mint before any transfer in its transaction.
    let err = engine
        .handle_event(
            &event_meta,
            PairEvent::Mint {
                sender: USER,
                amount0: wei(1),
                amount1: wei(1),
            },
        )
        .unwrap_err();
    assert!(matches!(err, IndexError::TransactionNotFound(_)));

    // Transaction exists (via a swap) but holds no pending mint.
    engine
        .handle_event(
            &event_meta,
            PairEvent::Swap {
                sender: USER,
                amount0_in: wei(1),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: wei(1),
                to: USER,
            },
        )
        .unwrap();
    let err = engine
        .handle_event(
            &event_meta,
            PairEvent::Mint {
                sender: USER,
                amount0: wei(1),
                amount1: wei(1),
            },
        )
        .unwrap_err();
    assert!(matches!(err, IndexError::PendingMintMissing(_)));

    // Event for a pool the factory never announced.
    let err = engine
        .handle_event(
            &meta(Address::repeat_byte(0xee), B256::repeat_byte(0xd2), 1_000_500),
            PairEvent::Transfer {
                from: Address::ZERO,
                to: USER,
                value: wei(1),
            },
        )
        .unwrap_err();
    assert!(matches!(err, IndexError::PairNotFound(_)));
}
