//! # engine::simulator
//!
//! **Price Simulator** — a bounded random walk over a fixed table of Indian
//! market tickers, giving the dashboard the feel of a live market without an
//! exchange dependency.
//!
//! Every read path (`snapshot`, `list`, `price_of`) advances the walk first,
//! but the advance is throttled: no matter how many concurrent HTTP requests
//! and WebSocket loops ask for prices, the table mutates at most once per
//! throttle interval.  The interval check is the sole rate limiter — there is
//! no background scheduler driving the walk.
//!
//! Throttle state and price table share one `Mutex`, so parallel connection
//! loops cannot double-apply the walk inside a single interval.  The lock
//! only guards in-memory mutation and is never held across an await point.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;

use crate::models::{MarketSnapshot, PriceDirection, SnapshotEntry, StockRow};

// ─── Symbol Table ─────────────────────────────────────────────────────────────

/// Base reference prices (INR).  Fixed for the process lifetime; the walk
/// always measures change against these.
const BASE_PRICES: &[(&str, f64)] = &[
    ("NIFTY50", 22_500.0),
    ("SENSEX", 74_000.0),
    ("PAYTM", 520.0),
    ("ZOMATO", 205.0),
    ("SWIGGY", 420.0),
    ("NYKAA", 170.0),
    ("POLICYBAZAAR", 890.0),
    ("DELHIVERY", 390.0),
    ("MAPMYINDIA", 1_750.0),
    ("IDEAFORGE", 680.0),
];

/// Per-tick drift bound: each tick multiplies a price by `1 ± 0.3 %` at most.
const MAX_DRIFT: f64 = 0.003;

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct TickerState {
    symbol: &'static str,
    base: f64,
    price: f64,
}

#[derive(Debug)]
struct WalkState {
    /// Initialization order is the presentation order of `list()`.
    tickers: Vec<TickerState>,
    /// `None` until the first tick, which therefore always applies.
    last_tick: Option<Instant>,
}

// ─── PriceSimulator ───────────────────────────────────────────────────────────

pub struct PriceSimulator {
    state: Mutex<WalkState>,
    min_interval: Duration,
}

impl PriceSimulator {
    /// Build the simulator with every ticker at its base price.
    pub fn new(min_interval: Duration) -> Self {
        let tickers = BASE_PRICES
            .iter()
            .map(|&(symbol, base)| TickerState { symbol, base, price: base })
            .collect();

        Self {
            state: Mutex::new(WalkState { tickers, last_tick: None }),
            min_interval,
        }
    }

    /// Advance the walk if the throttle interval has elapsed; no-op otherwise.
    ///
    /// Safe to call arbitrarily often — rapid successive calls collapse into
    /// one mutation per interval.
    pub fn tick(&self) {
        let mut rng = rand::thread_rng();
        self.tick_with(|| rng.gen_range(-MAX_DRIFT..=MAX_DRIFT));
    }

    /// Point-in-time view of every ticker, keyed by symbol, stamped with the
    /// capture time.
    pub fn snapshot(&self) -> MarketSnapshot {
        self.tick();
        let state = self.lock();
        let timestamp = Utc::now();

        state
            .tickers
            .iter()
            .map(|t| {
                let change = round2(t.price - t.base);
                (
                    t.symbol.to_string(),
                    SnapshotEntry {
                        price: t.price,
                        change,
                        change_pct: round2(change / t.base * 100.0),
                        direction: PriceDirection::from_change(change),
                        timestamp,
                    },
                )
            })
            .collect()
    }

    /// Ordered stock list (initialization order), without timestamps.
    pub fn list(&self) -> Vec<StockRow> {
        self.tick();
        let state = self.lock();

        state
            .tickers
            .iter()
            .map(|t| {
                let change = round2(t.price - t.base);
                StockRow {
                    ticker: t.symbol.to_string(),
                    price: t.price,
                    change,
                    change_pct: round2(change / t.base * 100.0),
                    direction: PriceDirection::from_change(change),
                }
            })
            .collect()
    }

    /// Current price for a case-insensitive ticker lookup; `None` if the
    /// symbol is not tracked.
    pub fn price_of(&self, ticker: &str) -> Option<f64> {
        self.tick();
        let state = self.lock();

        state
            .tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(ticker))
            .map(|t| t.price)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Throttled walk step with an injectable drift source.
    ///
    /// `drift` is drawn once per ticker per applied tick.
    fn tick_with<F: FnMut() -> f64>(&self, mut drift: F) {
        let mut state = self.lock();

        let due = match state.last_tick {
            Some(last) => last.elapsed() > self.min_interval,
            None => true,
        };
        if !due {
            return;
        }

        for ticker in &mut state.tickers {
            ticker.price = round2(ticker.price * (1.0 + drift()));
        }
        state.last_tick = Some(Instant::now());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WalkState> {
        // Price mutation cannot panic, so a poisoned lock is unreachable;
        // recover rather than propagate poison to every reader.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Round to 2 decimal places, matching the precision the dashboard renders.
#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(interval: Duration) -> PriceSimulator {
        PriceSimulator::new(interval)
    }

    #[test]
    fn forced_walk_matches_expected_math() {
        let sim = sim(Duration::from_secs(60));
        sim.tick_with(|| 0.003);

        let snapshot = sim.snapshot();
        let nifty = &snapshot["NIFTY50"];
        assert_eq!(nifty.price, 22_567.5);
        assert_eq!(nifty.change, 67.5);
        assert_eq!(nifty.change_pct, 0.3);
        assert_eq!(nifty.direction, PriceDirection::Up);
    }

    #[test]
    fn second_tick_inside_window_is_a_noop() {
        let sim = sim(Duration::from_secs(60));
        sim.tick_with(|| 0.003);
        let after_first = sim.price_of("NIFTY50").unwrap();

        // Still inside the 60 s window — must not mutate again.
        sim.tick_with(|| 0.003);
        assert_eq!(sim.price_of("NIFTY50").unwrap(), after_first);
    }

    #[test]
    fn prices_stay_positive_through_sustained_decline() {
        let sim = sim(Duration::ZERO);
        for _ in 0..1_000 {
            sim.tick_with(|| -MAX_DRIFT);
        }
        for row in sim.list() {
            assert!(row.price > 0.0, "{} went non-positive", row.ticker);
        }
    }

    #[test]
    fn direction_tracks_sign_of_change() {
        let falling = sim(Duration::from_secs(60));
        falling.tick_with(|| -0.003);
        for (ticker, entry) in falling.snapshot() {
            assert!(entry.price < base_of(&ticker), "{ticker}");
            assert_eq!(entry.direction, PriceDirection::Down, "{ticker}");
        }

        let rising = sim(Duration::from_secs(60));
        rising.tick_with(|| 0.003);
        for (ticker, entry) in rising.snapshot() {
            assert!(entry.price >= base_of(&ticker), "{ticker}");
            assert_eq!(entry.direction, PriceDirection::Up, "{ticker}");
        }
    }

    #[test]
    fn list_preserves_initialization_order() {
        let sim = sim(Duration::from_secs(60));
        let tickers: Vec<String> = sim.list().into_iter().map(|r| r.ticker).collect();
        let expected: Vec<String> =
            BASE_PRICES.iter().map(|&(s, _)| s.to_string()).collect();
        assert_eq!(tickers, expected);
    }

    #[test]
    fn lookup_is_case_insensitive_and_absent_for_unknown() {
        let sim = sim(Duration::from_secs(60));
        assert!(sim.price_of("zomato").is_some());
        assert!(sim.price_of("Zomato").is_some());
        assert_eq!(sim.price_of("TSLA"), None);
    }

    fn base_of(ticker: &str) -> f64 {
        BASE_PRICES.iter().find(|&&(s, _)| s == ticker).unwrap().1
    }
}
