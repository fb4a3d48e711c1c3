/// SPL Token program id.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Wrapped SOL mint, also used to key native SOL prices.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownToken {
    pub mint: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    /// Market data id used for USD pricing.
    pub coingecko_id: &'static str,
}

pub const KNOWN_TOKENS: &[KnownToken] = &[
    KnownToken {
        mint: NATIVE_MINT,
        symbol: "SOL",
        decimals: 9,
        coingecko_id: "solana",
    },
    KnownToken {
        mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        symbol: "USDC",
        decimals: 6,
        coingecko_id: "usd-coin",
    },
    KnownToken {
        mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
        symbol: "USDT",
        decimals: 6,
        coingecko_id: "tether",
    },
    KnownToken {
        mint: "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So",
        symbol: "mSOL",
        decimals: 9,
        coingecko_id: "msol",
    },
];

pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// Display symbol for a mint, `"Unknown"` when the mint is not listed.
pub fn symbol_for_mint(mint: &str) -> &'static str {
    KNOWN_TOKENS
        .iter()
        .find(|t| t.mint == mint)
        .map_or(UNKNOWN_SYMBOL, |t| t.symbol)
}

/// Market data id for a token symbol (case-insensitive).
pub fn coingecko_id_for_symbol(symbol: &str) -> Option<&'static str> {
    KNOWN_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .map(|t| t.coingecko_id)
}
