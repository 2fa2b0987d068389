use alloy::sol;

sol! {
    // ABI Multicall3 @ 0xcA11bde05977b3631167028862bE2a173976CA11
    #[sol(rpc)]
    contract Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calls)
            public
            payable
            returns (Result[] returnData);
    }
}
