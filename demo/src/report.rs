//! Top-of-book rendering.

use std::fmt::Write;

use serum_market_sdk::{BidAsk, OrderBookSnapshot};

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders the best bid/ask, midpoint and book levels of `market`.
#[must_use]
pub fn render_top_of_book(market: &str, quote: &BidAsk, book: &OrderBookSnapshot) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Market {}", market);
    let _ = writeln!(
        out,
        "  bid {}  ask {}  mid {}  spread {}",
        or_dash(quote.bid),
        or_dash(quote.ask),
        or_dash(quote.midpoint()),
        or_dash(quote.spread())
    );
    if book.is_empty() {
        let _ = writeln!(out, "  (order book empty)");
    } else {
        let _ = write!(out, "{}", book);
    }
    out
}
