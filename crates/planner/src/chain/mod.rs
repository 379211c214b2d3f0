//! [`PoolStateProvider`] over a json-rpc node, reading through the state view
//! and position manager lenses.

use std::marker::PhantomData;

use alloy::{
    primitives::{aliases::I24, Address, B256, U256},
    providers::Provider,
    transports::Transport
};
use eyre::{eyre, Context};
use m00n_types::{
    contract_bindings::{
        erc20::IERC20Metadata,
        ext::{PoolKeyExt, UnpackPositionInfo},
        position_manager::{IPositionManager, PoolKey},
        state_view::IStateView
    },
    pool::{FeeGrowthInside, PoolState, PositionDetails, SqrtPriceX96, TickRange},
    token::TokenMetadata
};

use crate::common::{PoolStateProvider, ProviderFuture};

pub struct RpcPoolStateProvider<P, T> {
    provider:         P,
    position_manager: Address,
    state_view:       Address,
    _transport:       PhantomData<fn() -> T>
}

impl<P, T> RpcPoolStateProvider<P, T>
where
    T: Transport + Clone,
    P: Provider<T>
{
    pub fn new(provider: P, position_manager: Address, state_view: Address) -> Self {
        Self { provider, position_manager, state_view, _transport: PhantomData }
    }

    async fn read_pool_state(&self, key: PoolKey) -> eyre::Result<PoolState> {
        let pool_id = key.pool_id();
        let view = IStateView::new(self.state_view, &self.provider);

        let slot0_call = view.getSlot0(pool_id);
        let liquidity_call = view.getLiquidity(pool_id);
        let (slot0, liquidity) = tokio::try_join!(slot0_call.call(), liquidity_call.call())
            .wrap_err_with(|| format!("reading slot0 of pool {pool_id}"))?;

        if slot0.sqrtPriceX96.is_zero() {
            return Err(eyre!("pool {pool_id} is not initialized"))
        }
        let state = PoolState::new(
            SqrtPriceX96::from(slot0.sqrtPriceX96),
            slot0.tick.as_i32(),
            liquidity.liquidity
        );
        tracing::debug!(%pool_id, tick = state.tick, liquidity = state.liquidity, "read pool state");
        Ok(state)
    }

    async fn read_position(&self, token_id: U256) -> eyre::Result<PositionDetails> {
        let manager = IPositionManager::new(self.position_manager, &self.provider);
        let info = manager
            .getPoolAndPositionInfo(token_id)
            .call()
            .await
            .wrap_err_with(|| format!("reading position {token_id}"))?;
        if info.poolKey.tickSpacing.is_zero() {
            return Err(eyre!("position {token_id} does not exist"))
        }

        let key = info.poolKey;
        let unpacked = info.info.unpack_position_info();
        let range = TickRange { lower: unpacked.tick_lower, upper: unpacked.tick_upper };

        // positions are owned by the manager and salted with their token id
        let view = IStateView::new(self.state_view, &self.provider);
        let position = view
            .getPositionInfo(
                key.pool_id(),
                self.position_manager,
                key_tick(range.lower)?,
                key_tick(range.upper)?,
                B256::from(token_id)
            )
            .call()
            .await
            .wrap_err_with(|| format!("reading pool side of position {token_id}"))?;

        Ok(PositionDetails {
            token_id,
            pool_key: key,
            range,
            liquidity: position.liquidity,
            fee_growth_inside0_last_x128: position.feeGrowthInside0LastX128,
            fee_growth_inside1_last_x128: position.feeGrowthInside1LastX128
        })
    }

    async fn read_fee_growth(&self, key: PoolKey, range: TickRange) -> eyre::Result<FeeGrowthInside> {
        let view = IStateView::new(self.state_view, &self.provider);
        let growth = view
            .getFeeGrowthInside(key.pool_id(), key_tick(range.lower)?, key_tick(range.upper)?)
            .call()
            .await
            .wrap_err_with(|| format!("reading fee growth for [{}, {})", range.lower, range.upper))?;

        Ok(FeeGrowthInside {
            fee_growth_inside0_x128: growth.feeGrowthInside0X128,
            fee_growth_inside1_x128: growth.feeGrowthInside1X128
        })
    }

    async fn read_metadata(&self, token: Address) -> TokenMetadata {
        if token.is_zero() {
            return TokenMetadata::Known { address: token, symbol: "MON".into(), decimals: 18 }
        }
        let erc20 = IERC20Metadata::new(token, &self.provider);
        let symbol_call = erc20.symbol();
        let decimals_call = erc20.decimals();

        match tokio::join!(symbol_call.call(), decimals_call.call()) {
            (Ok(symbol), Ok(decimals)) => {
                TokenMetadata::Known { address: token, symbol: symbol._0, decimals: decimals._0 }
            }
            (symbol, decimals) => {
                tracing::warn!(
                    %token,
                    symbol_err = ?symbol.err(),
                    decimals_err = ?decimals.err(),
                    "token metadata unavailable"
                );
                TokenMetadata::Unknown { address: token }
            }
        }
    }
}

fn key_tick(tick: i32) -> eyre::Result<I24> {
    I24::try_from(tick).map_err(|_| eyre!("tick {tick} overflows int24"))
}

impl<P, T> PoolStateProvider for RpcPoolStateProvider<P, T>
where
    T: Transport + Clone,
    P: Provider<T> + Send + Sync
{
    fn pool_state(&self, key: PoolKey) -> ProviderFuture<'_, PoolState> {
        Box::pin(self.read_pool_state(key))
    }

    fn position_details(&self, token_id: U256) -> ProviderFuture<'_, PositionDetails> {
        Box::pin(self.read_position(token_id))
    }

    fn fee_growth_inside(
        &self,
        key: PoolKey,
        range: TickRange
    ) -> ProviderFuture<'_, FeeGrowthInside> {
        Box::pin(self.read_fee_growth(key, range))
    }

    fn token_metadata(&self, token: Address) -> ProviderFuture<'_, TokenMetadata> {
        Box::pin(async move { Ok(self.read_metadata(token).await) })
    }
}
