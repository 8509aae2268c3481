//! Shared value types for the chat engine.
//!
//! Everything here is request-scoped data: intents, chart descriptions,
//! and the reply payload handed back to the HTTP layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Intent
// =============================================================================

/// Category of a user message, driving which canned reply and chart apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    CandlestickHelp,
    StockBasics,
    MutualFund,
    Sip,
    RiskDiversification,
    Fallback,
}

impl Intent {
    /// All intents, in classifier priority order with `Fallback` last.
    pub const ALL: [Intent; 7] = [
        Intent::Greeting,
        Intent::CandlestickHelp,
        Intent::StockBasics,
        Intent::MutualFund,
        Intent::Sip,
        Intent::RiskDiversification,
        Intent::Fallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::CandlestickHelp => "candlestick_help",
            Intent::StockBasics => "stock_basics",
            Intent::MutualFund => "mutual_fund",
            Intent::Sip => "sip",
            Intent::RiskDiversification => "risk_diversification",
            Intent::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ChartSpec
// =============================================================================

/// A point on a line chart's x axis: either a category label or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

impl From<&str> for AxisValue {
    fn from(s: &str) -> Self {
        AxisValue::Label(s.to_string())
    }
}

impl From<f64> for AxisValue {
    fn from(n: f64) -> Self {
        AxisValue::Number(n)
    }
}

/// Renderer-agnostic description of a chart shown alongside a reply.
///
/// Serialized with a `type` discriminator so the client can pick a renderer:
/// `{"type": "pie", "title": ..., "labels": [...], "values": [...]}`.
/// Values are illustrative, never live market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartSpec {
    Candlestick {
        title: String,
        x: Vec<String>,
        open: Vec<f64>,
        close: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
    },
    Line {
        title: String,
        x: Vec<AxisValue>,
        y: Vec<f64>,
        label: String,
    },
    Area {
        title: String,
        x: Vec<f64>,
        y: Vec<f64>,
        label: String,
    },
    Pie {
        title: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },
}

/// A chart whose parallel arrays disagree in length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{chart} chart '{title}': {field} has {actual} points, expected {expected}")]
pub struct ChartShapeError {
    pub chart: &'static str,
    pub title: String,
    pub field: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl ChartSpec {
    /// Renderer name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ChartSpec::Candlestick { .. } => "candlestick",
            ChartSpec::Line { .. } => "line",
            ChartSpec::Area { .. } => "area",
            ChartSpec::Pie { .. } => "pie",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Candlestick { title, .. }
            | ChartSpec::Line { title, .. }
            | ChartSpec::Area { title, .. }
            | ChartSpec::Pie { title, .. } => title,
        }
    }

    /// Number of data points along the primary axis.
    pub fn len(&self) -> usize {
        match self {
            ChartSpec::Candlestick { x, .. } => x.len(),
            ChartSpec::Line { x, .. } => x.len(),
            ChartSpec::Area { x, .. } => x.len(),
            ChartSpec::Pie { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every parallel array matches the primary axis length.
    pub fn validate(&self) -> Result<(), ChartShapeError> {
        let expected = self.len();
        let fields: Vec<(&'static str, usize)> = match self {
            ChartSpec::Candlestick {
                open,
                close,
                high,
                low,
                ..
            } => vec![
                ("open", open.len()),
                ("close", close.len()),
                ("high", high.len()),
                ("low", low.len()),
            ],
            ChartSpec::Line { y, .. } | ChartSpec::Area { y, .. } => vec![("y", y.len())],
            ChartSpec::Pie { values, .. } => vec![("values", values.len())],
        };

        match fields.into_iter().find(|(_, actual)| *actual != expected) {
            Some((field, actual)) => Err(ChartShapeError {
                chart: self.kind(),
                title: self.title().to_string(),
                field,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// ChatReply
// =============================================================================

/// Successful answer to one chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub chart: Option<ChartSpec>,
}

impl ChatReply {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            chart: None,
        }
    }
}
