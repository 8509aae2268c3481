//! Keyword intent classifier.
//!
//! Maps raw user text to exactly one [`Intent`] using an ordered table of
//! substring rules. Several rules can match the same message ("stock sip"),
//! so table order is the tie-break: the first matching rule wins.

use crate::types::Intent;

/// One row of the rule table: any keyword contained in the lower-cased
/// message selects `intent`.
#[derive(Debug)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

/// Rules in priority order. `Fallback` has no row; it is the default.
static INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Greeting,
        keywords: &["hi", "hello", "hey", "greetings"],
    },
    IntentRule {
        intent: Intent::CandlestickHelp,
        keywords: &[
            "candlestick",
            "candle stick",
            "read candles",
            "how to read candles",
            "read candlestick",
            "understand candles",
            "interpret candles",
        ],
    },
    IntentRule {
        intent: Intent::StockBasics,
        keywords: &["stock", "share"],
    },
    IntentRule {
        intent: Intent::MutualFund,
        keywords: &["mutual fund", "mutualfund"],
    },
    IntentRule {
        intent: Intent::Sip,
        keywords: &["sip"],
    },
    IntentRule {
        intent: Intent::RiskDiversification,
        keywords: &["risk", "diversify", "portfolio"],
    },
];

/// Rule-based intent classifier. Stateless; one instance can be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// The ordered rule table.
    pub fn rules(&self) -> &'static [IntentRule] {
        INTENT_RULES
    }

    /// Classify a message.
    ///
    /// Matching is plain substring containment on the lower-cased text, so
    /// "hi" also matches inside "this". Returns `Fallback` when no rule
    /// matches, including for the empty string.
    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        let intent = INTENT_RULES
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Fallback);

        tracing::debug!(intent = %intent, "Classified message");
        intent
    }
}
