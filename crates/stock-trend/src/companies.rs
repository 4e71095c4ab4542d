//! Ticker to company display names

const KNOWN_COMPANIES: [(&str, &str); 6] = [
    ("MSFT", "Microsoft Corporation"),
    ("AAPL", "Apple Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("META", "Meta Platforms, Inc."),
];

/// Display name for `symbol`, or the capitalized symbol when unknown
///
/// Lookup is on the upper-cased symbol; the fallback keeps the first
/// character upper-case and lower-cases the rest (`NVDA` becomes `Nvda`).
pub fn company_name(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    KNOWN_COMPANIES
        .iter()
        .find(|(ticker, _)| *ticker == upper)
        .map_or_else(|| capitalize(symbol), |(_, name)| (*name).to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}
