//! Positional edits of the `units_multiplier` header line
//!
//! `fields` and `units_multiplier` are parallel whitespace-separated token
//! lists; the multiplier for a channel sits at the channel's position in
//! `fields`. Edits are positional token swaps, never string substitution,
//! so a channel name appearing inside another token cannot be clobbered.

use std::fmt;

/// Result of editing a multiplier line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplierEdit {
    /// Rebuilt `units_multiplier` value, tokens joined by single spaces
    pub line: String,

    /// Whether the targeted token differs from its previous value
    pub changed: bool,

    /// Zero-based position of the edited channel
    pub position: usize,
}

/// Why a multiplier edit could not be planned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitsEditError {
    /// The channel does not appear in the `fields` line
    ChannelNotFound { channel: String },

    /// `fields` and `units_multiplier` disagree on token count
    TokenCountMismatch { fields: usize, multipliers: usize },
}

impl fmt::Display for UnitsEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelNotFound { channel } => {
                write!(f, "channel '{channel}' not present in fields")
            }
            Self::TokenCountMismatch {
                fields,
                multipliers,
            } => write!(
                f,
                "fields has {fields} tokens but units_multiplier has {multipliers}"
            ),
        }
    }
}

/// Set the multiplier token for one channel
///
/// Locates `channel` in the `fields` token list and replaces the token at
/// the same position in the `units_multiplier` token list with `value`.
/// Surrounding tokens are untouched; the rebuilt line is normalized to
/// single-space separators.
pub fn set_channel_multiplier(
    fields_line: &str,
    multiplier_line: &str,
    channel: &str,
    value: &str,
) -> std::result::Result<MultiplierEdit, UnitsEditError> {
    let field_tokens: Vec<&str> = fields_line.split_whitespace().collect();
    let mut multiplier_tokens: Vec<&str> = multiplier_line.split_whitespace().collect();

    let position = field_tokens
        .iter()
        .position(|&token| token == channel)
        .ok_or_else(|| UnitsEditError::ChannelNotFound {
            channel: channel.to_string(),
        })?;

    if field_tokens.len() != multiplier_tokens.len() {
        return Err(UnitsEditError::TokenCountMismatch {
            fields: field_tokens.len(),
            multipliers: multiplier_tokens.len(),
        });
    }

    let changed = multiplier_tokens[position] != value;
    multiplier_tokens[position] = value;

    Ok(MultiplierEdit {
        line: multiplier_tokens.join(" "),
        changed,
        position,
    })
}
