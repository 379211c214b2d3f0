use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration
};

use alloy::{
    providers::{ProviderBuilder, RootProvider},
    transports::http::{Client, Http}
};
use clap::{Parser, Subcommand};
use eyre::Context;
use planner::{
    chain::RpcPoolStateProvider,
    common::{SystemClock, TtlCache},
    config::PlannerConfig,
    pricing::{CachedPriceOracle, TokenPriceGenerator},
    requests::FeesRequest,
    responses::ErrorResponse,
    PlanError, PositionPlanner
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

type ChainProvider = Arc<RpcPoolStateProvider<RootProvider<Http<Client>>, Http<Client>>>;
type Planner =
    PositionPlanner<ChainProvider, CachedPriceOracle<TokenPriceGenerator<ChainProvider>>>;

#[derive(Debug, Parser)]
#[command(name = "m00n-lp", version)]
#[command(about = "Plans Uniswap v4 liquidity positions for the m00n pool")]
pub struct Cli {
    /// Path to the planner configuration
    #[arg(short, long, global = true, default_value = "m00n-lp.toml")]
    config:  PathBuf,
    /// JSON request file, read from stdin when omitted
    #[arg(short, long, global = true)]
    request: Option<PathBuf>,
    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Ticks and token amounts for a deposit into a USD band
    Quote,
    /// Quote plus the calldata minting the position
    Mint,
    /// Add liquidity to an existing position
    Increase,
    /// Claim a position's fees
    Collect,
    /// Reinvest a position's fees into it
    Compound,
    /// Remove part or all of a position
    Withdraw,
    /// Lifetime and unclaimed fees for one or more positions
    Fees
}

impl Cli {
    pub async fn run(self) -> eyre::Result<ExitCode> {
        let config = PlannerConfig::load(&self.config)?;
        tracing::info!(chain_id = config.chain_id, command = ?self.command, "loaded config");

        let raw = read_request(self.request.as_deref())?;
        let planner = build_planner(&config)?;

        match respond(self.command, &planner, &raw).await {
            Ok(response) => {
                print_json(&response)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                tracing::debug!(error = err.error, "request failed");
                print_json(&err)?;
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn build_planner(config: &PlannerConfig) -> eyre::Result<Planner> {
    let rpc = ProviderBuilder::new().on_http(config.rpc_url()?);
    let chain: ChainProvider = Arc::new(RpcPoolStateProvider::new(
        rpc,
        config.contracts.position_manager,
        config.contracts.state_view
    ));

    let prices = TokenPriceGenerator::from_config(chain.clone(), &config.oracle)
        .wrap_err("building token price routes")?;
    let cache = TtlCache::new(
        config.oracle.cache_capacity,
        Duration::from_secs(config.oracle.cache_ttl_secs),
        SystemClock
    );

    PositionPlanner::from_config(config, chain, CachedPriceOracle::new(prices, cache), SystemClock)
}

fn read_request(path: Option<&Path>) -> eyre::Result<String> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading request {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .wrap_err("reading request from stdin")?;
            raw
        }
    };
    if raw.trim().is_empty() {
        return Ok("{}".to_string())
    }
    Ok(raw)
}

async fn respond(command: Command, planner: &Planner, raw: &str) -> Result<Value, ErrorResponse> {
    match command {
        Command::Quote => to_json(planner.quote_range(&parse(raw)?).await),
        Command::Mint => to_json(planner.plan_mint(&parse(raw)?).await),
        Command::Increase => to_json(planner.plan_increase(&parse(raw)?).await),
        Command::Collect => to_json(planner.plan_collect(&parse(raw)?).await),
        Command::Compound => to_json(planner.plan_compound(&parse(raw)?).await),
        Command::Withdraw => to_json(planner.plan_withdraw(&parse(raw)?).await),
        Command::Fees => {
            let request: FeesRequest = parse(raw)?;
            let token_ids = request
                .token_ids()
                .map_err(|err| ErrorResponse::from(&err))?;
            match token_ids.as_slice() {
                [token_id] if request.token_ids.is_empty() => {
                    to_json(planner.position_fees(*token_id).await)
                }
                batch => to_json(Ok(planner.positions_fees(batch).await))
            }
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, ErrorResponse> {
    serde_json::from_str(raw)
        .map_err(|err| ErrorResponse { error: "invalid_request", message: err.to_string() })
}

fn to_json<T: Serialize>(result: Result<T, PlanError>) -> Result<Value, ErrorResponse> {
    let response = result.map_err(|err| ErrorResponse::from(&err))?;
    serde_json::to_value(response)
        .map_err(|err| ErrorResponse { error: "internal", message: err.to_string() })
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
