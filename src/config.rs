use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "coffee-tui", about = "Terminal tip jar for the BuyMeACoffee contract")]
pub struct Config {
    /// Wallet JSON-RPC endpoint (a local desktop signing wallet)
    #[arg(short, long, env = "WALLET_RPC_URL", default_value = "http://127.0.0.1:1248")]
    pub wallet_url: String,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Poll interval in seconds for the NewMemo log filter
    #[arg(long, default_value = "4")]
    pub poll_interval_secs: u64,

    /// Diagnostic log destination (the terminal belongs to the UI)
    #[arg(long, default_value = "coffee-tui.log")]
    pub log_file: String,
}
