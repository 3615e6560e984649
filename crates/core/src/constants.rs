/// Maximum number of history points kept per asset.
pub const HISTORY_RETENTION_LIMIT: usize = 30;

/// Assets synthesised when the price file is absent or unreadable: (id, name, symbol).
pub const DEFAULT_TRACKED_ASSETS: &[(&str, &str, &str)] = &[
    ("bitcoin", "Bitcoin", "BTC"),
    ("ethereum", "Ethereum", "ETH"),
    ("ripple", "XRP", "XRP"),
    ("cardano", "Cardano", "ADA"),
    ("solana", "Solana", "SOL"),
];
