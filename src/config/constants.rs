/// Maximum number of concurrent HTTP requests when fetching token lists
pub const TOKEN_FETCH_CONCURRENCY: usize = 10;

/// First delay between retries of a failed network call, doubled per attempt
pub const RETRY_BASE_DELAY_MS: u64 = 500;

pub const LIST_NAME: &str = "ParaSwap Community Token Lists";

pub const STABLE_LIST_NAME: &str = "ParaSwap Stablecoin Token List";

pub const LIST_LOGO_URI: &str =
    "https://uploads-ssl.webflow.com/617aa5e4225be2555942852c/6214d5c4db4ce4d976b5f1f9_logo_paraswap-handbook%20copy%201.svg";

pub const LIST_KEYWORDS: [&str; 4] = ["ParaSwap", "Token Lists", "DAO", "Community"];

/// File stem of the cached stablecoin reference list
pub const STABLE_SOURCE_FILENAME: &str = "stablecoins";
