use std::sync::Arc;

use alloy::{
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use anyhow::Result;
use futures_util::StreamExt;
use hashbrown::HashMap;
use tracing::Level;

use tidewatch_abi::{IUniswapV2Factory, IUniswapV2Pair, IERC20};
use tidewatch_common::{EventMeta, PairEvent};
use tidewatch_config::Config;
use tidewatch_core::{Engine, PairIndex};
use tidewatch_logger::init_logger;

type P = Arc<RootProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger(Level::INFO);

    let config = Config::load("./config.json".into())?;

    let provider: P = Arc::new(ProviderBuilder::default().connect(&config.rpc_url).await?);

    let engine = Engine::new(config.pricing.clone(), PairIndex::new());

    if let Err(e) = run(engine, config, provider).await {
        tracing::error!("{e:?}");
    }

    Ok(())
}

fn pair_event_filter() -> Filter {
    Filter::new().event_signature(vec![
        IUniswapV2Factory::PairCreated::SIGNATURE_HASH,
        IUniswapV2Pair::Transfer::SIGNATURE_HASH,
        IUniswapV2Pair::Sync::SIGNATURE_HASH,
        IUniswapV2Pair::Mint::SIGNATURE_HASH,
        IUniswapV2Pair::Burn::SIGNATURE_HASH,
        IUniswapV2Pair::Swap::SIGNATURE_HASH,
    ])
}

async fn run(mut engine: Engine<PairIndex>, config: Config, provider: P) -> Result<()> {
    let filter = pair_event_filter();
    let mut stream = provider.subscribe_blocks().await?.into_stream();
    // Sender lookups hit the RPC once per transaction, not once per log.
    let mut senders: HashMap<B256, Address> = HashMap::new();

    while let Some(header) = stream.next().await {
        let f = filter
            .clone()
            .from_block(header.number)
            .to_block(header.number);
        let mut logs = provider.get_logs(&f).await?;
        logs.sort_by_key(|log| {
            (
                log.block_number.unwrap_or_default(),
                log.log_index.unwrap_or_default(),
            )
        });

        for log in &logs {
            process_log(
                &mut engine,
                &config,
                &provider,
                &mut senders,
                header.timestamp,
                log,
            )
            .await?;
        }

        tracing::info!(
            block = header.number,
            pairs = engine.protocol.pair_count,
            txs = engine.protocol.tx_count,
            "block indexed"
        );
    }

    Ok(())
}

async fn process_log(
    engine: &mut Engine<PairIndex>,
    config: &Config,
    provider: &P,
    senders: &mut HashMap<B256, Address>,
    timestamp: u64,
    log: &Log,
) -> Result<()> {
    let Some(&topic0) = log.topic0() else {
        return Ok(());
    };

    if topic0 == IUniswapV2Factory::PairCreated::SIGNATURE_HASH {
        if log.address() != config.factory {
            return Ok(());
        }
        let created = IUniswapV2Factory::PairCreated::decode_log(&log.inner, false)?;
        let decimals0 = token_decimals(provider, created.token0).await;
        let decimals1 = token_decimals(provider, created.token1).await;
        engine.create_pair(
            created.pair,
            created.token0,
            decimals0,
            created.token1,
            decimals1,
            timestamp,
            log.block_number.unwrap_or_default(),
        );
        engine
            .resolver_mut()
            .insert(created.token0, created.token1, created.pair);
        return Ok(());
    }

    let pair = log.address();
    // Transfer and friends fire on every ERC-20; only pools the factory
    // announced are indexed.
    if engine.store.pair(&pair).is_none() {
        return Ok(());
    }

    let Some(event) = decode_pair_event(topic0, log)? else {
        return Ok(());
    };

    let tx_hash = log.transaction_hash.unwrap_or_default();
    let tx_from = match senders.get(&tx_hash) {
        Some(sender) => *sender,
        None => {
            let sender = transaction_sender(provider, tx_hash).await?;
            senders.insert(tx_hash, sender);
            sender
        }
    };

    let meta = EventMeta {
        pair,
        block_number: log.block_number.unwrap_or_default(),
        timestamp,
        tx_hash,
        log_index: log.log_index.unwrap_or_default(),
        tx_from,
    };
    engine.handle_event(&meta, event)?;
    Ok(())
}

fn decode_pair_event(topic0: B256, log: &Log) -> Result<Option<PairEvent>> {
    let event = if topic0 == IUniswapV2Pair::Transfer::SIGNATURE_HASH {
        let e = IUniswapV2Pair::Transfer::decode_log(&log.inner, false)?;
        PairEvent::Transfer {
            from: e.from,
            to: e.to,
            value: e.value,
        }
    } else if topic0 == IUniswapV2Pair::Sync::SIGNATURE_HASH {
        let e = IUniswapV2Pair::Sync::decode_log(&log.inner, false)?;
        PairEvent::Sync {
            reserve0: U256::from(e.reserve0),
            reserve1: U256::from(e.reserve1),
        }
    } else if topic0 == IUniswapV2Pair::Mint::SIGNATURE_HASH {
        let e = IUniswapV2Pair::Mint::decode_log(&log.inner, false)?;
        PairEvent::Mint {
            sender: e.sender,
            amount0: e.amount0,
            amount1: e.amount1,
        }
    } else if topic0 == IUniswapV2Pair::Burn::SIGNATURE_HASH {
        let e = IUniswapV2Pair::Burn::decode_log(&log.inner, false)?;
        PairEvent::Burn {
            sender: e.sender,
            amount0: e.amount0,
            amount1: e.amount1,
            to: e.to,
        }
    } else if topic0 == IUniswapV2Pair::Swap::SIGNATURE_HASH {
        let e = IUniswapV2Pair::Swap::decode_log(&log.inner, false)?;
        PairEvent::Swap {
            sender: e.sender,
            amount0_in: e.amount0In,
            amount1_in: e.amount1In,
            amount0_out: e.amount0Out,
            amount1_out: e.amount1Out,
            to: e.to,
        }
    } else {
        return Ok(None);
    };
    Ok(Some(event))
}

async fn token_decimals(provider: &P, token: Address) -> u32 {
    let erc20 = IERC20::new(token, provider.clone());
    match erc20.decimals().call().await {
        Ok(decimals) => u32::from(decimals._0),
        Err(_) => 0,
    }
}

async fn transaction_sender(provider: &P, tx_hash: B256) -> Result<Address> {
    let tx = provider
        .get_transaction_by_hash(tx_hash)
        .await?
        .ok_or_else(|| anyhow::anyhow!("transaction {tx_hash} not in chain"))?;
    Ok(tx.inner.signer())
}
