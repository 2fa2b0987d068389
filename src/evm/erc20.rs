use alloy::sol;

sol! {
   contract ERC20 {
        function symbol() public view returns (string);
        function name() public view returns (string);
        function decimals() public view returns (uint8);
   }
}

sol! {
   // Pre-standard tokens (MKR, SAI) return fixed bytes instead of strings.
   contract ERC20Bytes32 {
        function symbol() public view returns (bytes32);
        function name() public view returns (bytes32);
   }
}
