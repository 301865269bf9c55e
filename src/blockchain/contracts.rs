//! Contract bindings.

use alloy::sol;

sol! {
    /// CFD trade router.
    #[sol(rpc)]
    interface ITradeRouter {
        function openPosition(
            uint256 pairIndex,
            bytes proof,
            bool isLong,
            uint256 leverage,
            uint256 amount,
            uint256 stopLoss,
            uint256 takeProfit
        ) external;
    }

    /// Collateral token.
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Test collateral faucet.
    #[sol(rpc)]
    interface IFaucet {
        function claim() external;
    }
}
