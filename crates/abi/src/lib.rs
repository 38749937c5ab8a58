use alloy::sol;

// Pair contracts emit generic ERC-20 Transfer events for their own
// liquidity token alongside the pool events proper.
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IUniswapV2Pair {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Sync(uint112 reserve0, uint112 reserve1);
        event Mint(address indexed sender, uint256 amount0, uint256 amount1);
        event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to);
        event Swap(
            address indexed sender,
            uint256 amount0In,
            uint256 amount1In,
            uint256 amount0Out,
            uint256 amount1Out,
            address indexed to
        );

        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves()
            external
            view
            returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IUniswapV2Factory {
        event PairCreated(address indexed token0, address indexed token1, address pair, uint256);

        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
);
