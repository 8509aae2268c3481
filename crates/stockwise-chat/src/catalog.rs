//! Canned reply and chart catalog for the rule-based engine.
//!
//! Each intent owns a fixed, non-empty list of reply variants and at most one
//! chart. Reply selection is random; chart lookup is not.

use std::collections::HashMap;

use rand::Rng;

use crate::types::{AxisValue, ChartSpec, Intent};

/// Placeholder replaced by the user's message in fallback variants.
const MESSAGE_SLOT: &str = "{message}";

const GREETING_REPLIES: &[&str] = &[
    "Hey there! 👋 I'm **StockWise AI**, your investing guide. Want to learn how to read candlesticks or SIP charts?",
    "Hello! 📊 Curious about stock chart reading or price patterns? Let’s explore together!",
    "Hi! 😊 I can teach you how to understand candlestick charts, trends, and market signals.",
];

const CANDLESTICK_REPLIES: &[&str] = &[
    "🕯️ A **candlestick** shows how a stock’s price moved in a time period. Each candle has:\n\
     • **Body** – the range between open & close prices.\n\
     • **Wick/Shadow** – the highest and lowest prices.\n\
     • **Color** – green (price went up) or red (price went down).",
    "📘 To **read candles**:\n\
     1️⃣ A **green candle** = price closed higher than it opened.\n\
     2️⃣ A **red candle** = price closed lower.\n\
     3️⃣ Long wicks show volatility — buyers/sellers fought hard.\n\
     4️⃣ Small bodies show indecision (called a *doji*).",
    "💡 Quick reading tips:\n\
     - If the candle closes above open → buyers dominated (bullish).\n\
     - If it closes below open → sellers dominated (bearish).\n\
     - Watch for patterns like **Hammer, Doji, Engulfing** — they predict trend reversals.",
    "🟩 **Green candle** → market bullish (buyers strong).\n\
     🟥 **Red candle** → market bearish (sellers strong).\n\
     📊 Combine multiple candles to see trends — rising greens = uptrend, falling reds = downtrend.",
];

const STOCK_REPLIES: &[&str] = &[
    "📈 **Stocks** represent ownership in a company. Their prices rise and fall based on demand, performance, and market trends.",
    "💹 Buying a **stock** means owning a part of a company. Price changes reflect market confidence and growth potential.",
    "📊 Stocks can be visualized using candlestick or line charts to see price movements.",
];

const MUTUAL_FUND_REPLIES: &[&str] = &[
    "💼 **Mutual funds** pool investors’ money and invest in diversified assets — stocks, bonds, or both.",
    "📘 A mutual fund’s performance is tracked by **NAV (Net Asset Value)** — the price per unit.",
    "🌱 Mutual funds are great for passive investors — diversification reduces risk.",
];

const SIP_REPLIES: &[&str] = &[
    "📅 A **Systematic Investment Plan (SIP)** lets you invest a fixed amount monthly — great for consistency and compounding.",
    "💰 SIPs use *rupee cost averaging* — you buy more when prices drop and less when they rise.",
    "🌟 SIPs are perfect for long-term investors — time and consistency beat timing the market.",
];

const RISK_REPLIES: &[&str] = &[
    "⚖️ Diversification spreads your risk across various assets like stocks, bonds, and gold.",
    "📊 A diversified portfolio protects you from market swings — if one asset drops, another may rise.",
    "💡 Don’t put all your eggs in one basket — that’s the key to smart investing.",
];

const FALLBACK_REPLIES: &[&str] = &[
    "🤔 I’m not connected to a live AI model yet, but I received: “{message}”. Try asking about *how to read candles*, *mutual funds*, or *SIP charts*.",
    "📩 You said: “{message}”. I can explain *candlestick reading*, *stock charts*, or *portfolio diversification*.",
];

struct CatalogEntry {
    variants: &'static [&'static str],
    chart: Option<ChartSpec>,
}

/// Immutable intent → (reply variants, chart) table.
///
/// Built once at startup and shared read-only across requests.
pub struct ResponseCatalog {
    entries: HashMap<Intent, CatalogEntry>,
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCatalog {
    /// Build the standard catalog.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        let mut insert = |intent, variants, chart| {
            entries.insert(intent, CatalogEntry { variants, chart });
        };

        insert(Intent::Greeting, GREETING_REPLIES, None);
        insert(
            Intent::CandlestickHelp,
            CANDLESTICK_REPLIES,
            Some(candlestick_example()),
        );
        insert(Intent::StockBasics, STOCK_REPLIES, Some(stock_trend_example()));
        insert(Intent::MutualFund, MUTUAL_FUND_REPLIES, Some(nav_growth_example()));
        insert(Intent::Sip, SIP_REPLIES, Some(sip_growth_example()));
        insert(
            Intent::RiskDiversification,
            RISK_REPLIES,
            Some(portfolio_example()),
        );
        insert(Intent::Fallback, FALLBACK_REPLIES, None);

        Self { entries }
    }

    /// The fixed reply templates for an intent.
    ///
    /// Fallback templates still contain the `{message}` slot.
    pub fn variants(&self, intent: Intent) -> &'static [&'static str] {
        self.entries
            .get(&intent)
            .map(|e| e.variants)
            .unwrap_or(FALLBACK_REPLIES)
    }

    /// Pick a reply using the thread-local random source.
    pub fn reply(&self, intent: Intent, user_text: &str) -> String {
        self.reply_with(intent, user_text, &mut rand::rng())
    }

    /// Pick a reply uniformly at random from the intent's variants.
    ///
    /// For `Fallback`, the chosen template gets `user_text` embedded verbatim.
    pub fn reply_with<R: Rng + ?Sized>(&self, intent: Intent, user_text: &str, rng: &mut R) -> String {
        let variants = self.variants(intent);
        let template = variants[rng.random_range(0..variants.len())];
        if intent == Intent::Fallback {
            template.replace(MESSAGE_SLOT, user_text)
        } else {
            template.to_string()
        }
    }

    /// The chart for an intent; `None` for greetings and fallback.
    pub fn chart(&self, intent: Intent) -> Option<&ChartSpec> {
        self.entries.get(&intent).and_then(|e| e.chart.as_ref())
    }
}

// =============================================================================
// Example charts
// =============================================================================

fn weekdays() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn candlestick_example() -> ChartSpec {
    ChartSpec::Candlestick {
        title: "Example Candlestick Chart".to_string(),
        x: weekdays(),
        open: vec![120.0, 130.0, 125.0, 140.0, 138.0],
        close: vec![130.0, 125.0, 140.0, 138.0, 145.0],
        high: vec![132.0, 135.0, 142.0, 142.0, 147.0],
        low: vec![118.0, 122.0, 123.0, 136.0, 137.0],
    }
}

fn stock_trend_example() -> ChartSpec {
    ChartSpec::Line {
        title: "Stock Price Trend Example".to_string(),
        x: weekdays().into_iter().map(AxisValue::Label).collect(),
        y: vec![130.0, 142.0, 137.0, 150.0, 160.0],
        label: "Stock Price (₹)".to_string(),
    }
}

fn nav_growth_example() -> ChartSpec {
    ChartSpec::Line {
        title: "Mutual Fund NAV Growth".to_string(),
        x: ["2020", "2021", "2022", "2023", "2024"]
            .into_iter()
            .map(AxisValue::from)
            .collect(),
        y: vec![10.0, 12.5, 14.8, 17.6, 19.2],
        label: "NAV (₹)".to_string(),
    }
}

fn sip_growth_example() -> ChartSpec {
    ChartSpec::Area {
        title: "SIP Growth Over 10 Years".to_string(),
        x: (1..=10).map(f64::from).collect(),
        y: vec![
            12000.0, 25000.0, 39000.0, 55000.0, 73000.0, 94000.0, 118000.0, 145000.0, 175000.0,
            210000.0,
        ],
        label: "Total Value (₹)".to_string(),
    }
}

fn portfolio_example() -> ChartSpec {
    ChartSpec::Pie {
        title: "Sample Diversified Portfolio".to_string(),
        labels: ["Equity", "Debt", "Gold", "Cash"]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        values: vec![50.0, 30.0, 15.0, 5.0],
    }
}
