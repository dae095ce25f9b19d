//! TAGGUARD Monitor - Message Inspection
//!
//! The candidate-tag scanner, the mismatch detector that turns inbound
//! negotiation-channel messages into verdicts, and the risk-phrase
//! screen for off-platform lures.

pub mod detector;
pub mod risk;
pub mod scanner;

pub use detector::MismatchDetector;
pub use risk::{screen, RiskFlags};
pub use scanner::scan;
