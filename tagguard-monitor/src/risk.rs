//! Off-platform lure screening for negotiation messages.
//!
//! Complements tag inspection: a scammer who keeps their tag consistent
//! still has to move the victim off-platform or onto an unprotected
//! payment rail, and those asks use a small, stable vocabulary.

/// Phrases that push a counterparty into unobservable direct messages.
pub const DM_LURE_PHRASES: &[&str] = &[
    "dm me",
    "check dm",
    "i sent it in dm",
    "let's finish in dm",
    "send it on discord",
    "message me",
    "pm me",
    "private message",
    "direct message",
    "text me privately",
    "continue in dm",
    "finish in dm",
    "move to dm",
    "talk in dm",
    "add me quick",
    "don't tell anyone",
    "outside deal",
    "trust me",
    "i'll go first",
    "send now",
    "whatsapp",
    "telegram",
    "snapchat",
    "join my server",
    "click here",
    "http://",
    "https://",
    "invite.gg",
    "discord.gg/",
    "qr code",
    "quick trade",
    "fast deal",
    "admin said",
    "mod said",
    "i got scammed",
];

/// Off-platform payment rails that void any trade protection.
pub const PAYMENT_PLATFORM_TERMS: &[&str] = &[
    "paypal",
    "revolut",
    "cashapp",
    "venmo",
    "crypto",
    "bitcoin",
    "ethereum",
    "gift card",
    "steam card",
    "google play card",
    "money transfer",
    "western union",
    "zelle",
    "apple pay",
    "google pay",
    "stripe",
    "square",
    "robinhood",
    "btc",
    "eth",
    "skrill",
    "bank transfer",
    "iban",
    "wise",
    "real money",
    "money trade",
    "rmt",
    "usd",
    "eur",
    "cash",
    "payment",
    "bank",
    "nitro for free",
    "free nitro",
    "steam gift",
];

/// Risky phrases found in one message, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFlags {
    pub dm_lures: Vec<&'static str>,
    pub payment_terms: Vec<&'static str>,
}

impl RiskFlags {
    /// True when any category fired.
    pub fn is_risky(&self) -> bool {
        !self.dm_lures.is_empty() || !self.payment_terms.is_empty()
    }
}

/// Case-insensitive substring screen over a message body.
///
/// Returns flags only; rendering warnings and moderation decisions are
/// the caller's concern.
pub fn screen(message_text: &str) -> RiskFlags {
    if message_text.is_empty() {
        return RiskFlags::default();
    }
    let lowered = message_text.to_lowercase();
    RiskFlags {
        dm_lures: DM_LURE_PHRASES
            .iter()
            .copied()
            .filter(|phrase| lowered.contains(phrase))
            .collect(),
        payment_terms: PAYMENT_PLATFORM_TERMS
            .iter()
            .copied()
            .filter(|phrase| lowered.contains(phrase))
            .collect(),
    }
}
