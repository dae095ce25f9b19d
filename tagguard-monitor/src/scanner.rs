//! Candidate-tag extraction from free text.

use tagguard_core::IdentityTag;

/// Extract every distinct, whole-token identity-tag candidate from
/// `text`, in order of first appearance.
///
/// A candidate must stand alone as a maximal alphanumeric run: a tag
/// shape embedded in a longer run (`XRC4637131`) is not a candidate.
/// Token boundaries are any non-alphanumeric character or the ends of
/// the string. Message bodies are attacker-controlled, so the whole pass
/// is a single linear split with an exact-shape check per token - no
/// backtracking anywhere.
///
/// Case is not folded here; the detector uppercases message text before
/// calling in, mirroring the registration path.
pub fn scan(text: &str) -> Vec<IdentityTag> {
    let mut found: Vec<IdentityTag> = Vec::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.len() != IdentityTag::LEN {
            continue;
        }
        if let Ok(tag) = IdentityTag::parse(token) {
            if !found.contains(&tag) {
                found.push(tag);
            }
        }
    }
    found
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
