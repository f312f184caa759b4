use serde_json::{Value, json};

/// Parameters of the one network this frontend targets.
pub struct ChainParams {
    pub name: &'static str,
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub explorer_url: &'static str,
}

/// The contract lives on Rinkeby; everything is pinned at compile time.
pub const TARGET_CHAIN: ChainParams = ChainParams {
    name: "Rinkeby Test Network",
    chain_id: 4,
    rpc_url: "https://rpc.ankr.com/eth_rinkeby",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://rinkeby.etherscan.io",
};

impl ChainParams {
    /// Chain id in the 0x-prefixed form wallet methods expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    /// `wallet_addEthereumChain` parameter object (EIP-3085).
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.name,
            "nativeCurrency": {
                "name": "Ethereum",
                "symbol": self.symbol,
                "decimals": self.decimals,
            },
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.explorer_url],
        })
    }
}
