//! Chat flood protection
//!
//! `FloodPolicy` is owned by the operator commands. `FloodGuard` is the
//! per-client consumer the chat path runs before relaying a message.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::constants::chat::{FLOOD_MAX_MESSAGES, FLOOD_MSG_MAX};
use crate::util::text::clip_to;

/// Violations when replacing the policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FloodPolicyError {
    #[error("All values must be positive numbers")]
    InvalidPolicy,
    #[error("Can only track up to 10 messages, got {0}")]
    PolicyLimitExceeded(u32),
}

/// Server-wide flood protection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodPolicy {
    /// Messages allowed per window; zero disables protection
    pub messages: u32,
    /// Window length in seconds
    pub window_secs: u32,
    /// How long an offender is silenced
    pub silence_secs: u32,
    /// Custom text sent to an offender, empty for the default
    pub warning: String,
}

impl Default for FloodPolicy {
    fn default() -> Self {
        Self {
            messages: 4,
            window_secs: 4,
            silence_secs: 10,
            warning: String::new(),
        }
    }
}

impl FloodPolicy {
    pub fn is_enabled(&self) -> bool {
        self.messages > 0
    }

    /// Replace the three numeric fields together, or none of them
    pub fn replace(&mut self, messages: i64, window: i64, silence: i64) -> Result<(), FloodPolicyError> {
        if messages <= 0 || window <= 0 || silence <= 0 {
            return Err(FloodPolicyError::InvalidPolicy);
        }
        if messages > FLOOD_MAX_MESSAGES as i64 {
            return Err(FloodPolicyError::PolicyLimitExceeded(
                messages.min(u32::MAX as i64) as u32,
            ));
        }
        let window = u32::try_from(window).map_err(|_| FloodPolicyError::InvalidPolicy)?;
        let silence = u32::try_from(silence).map_err(|_| FloodPolicyError::InvalidPolicy)?;

        self.messages = messages as u32;
        self.window_secs = window;
        self.silence_secs = silence;
        Ok(())
    }

    /// Store the warning text, clipped to the buffer size. Returns true when clipped.
    pub fn set_warning(&mut self, text: &str) -> bool {
        let clipped = clip_to(text, FLOOD_MSG_MAX);
        self.warning = clipped.to_string();
        clipped.len() < text.len()
    }

    pub fn describe(&self) -> String {
        if self.is_enabled() {
            format!(
                "Current floodprot settings: \nAfter {} msgs per {} seconds, silence for {} seconds\n",
                self.messages, self.window_secs, self.silence_secs
            )
        } else {
            "No floodprots enabled.\n".to_string()
        }
    }
}

/// Outcome of checking one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloodVerdict {
    Allowed,
    /// Still serving an earlier silence
    Silenced { remaining_secs: u64 },
    /// This message tripped the policy
    Tripped { notice: String },
}

/// Per-client message history
#[derive(Debug, Clone, Default)]
pub struct FloodGuard {
    said_at: VecDeque<Instant>,
    locked_until: Option<Instant>,
}

impl FloodGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a message sent at `now` and record it when allowed
    pub fn check(&mut self, policy: &FloodPolicy, now: Instant) -> FloodVerdict {
        if !policy.is_enabled() {
            return FloodVerdict::Allowed;
        }

        if let Some(until) = self.locked_until {
            if now < until {
                let remaining = until - now;
                return FloodVerdict::Silenced {
                    remaining_secs: remaining.as_secs_f64().ceil() as u64,
                };
            }
            self.locked_until = None;
        }

        let depth = policy.messages as usize;
        if self.said_at.len() >= depth {
            let oldest = self.said_at[self.said_at.len() - depth];
            if now.duration_since(oldest) < Duration::from_secs(policy.window_secs as u64) {
                self.locked_until = Some(now + Duration::from_secs(policy.silence_secs as u64));
                let notice = if policy.warning.is_empty() {
                    format!("FloodProt: You can't talk for {} seconds.\n", policy.silence_secs)
                } else {
                    format!("{}\n", policy.warning)
                };
                return FloodVerdict::Tripped { notice };
            }
        }

        self.said_at.push_back(now);
        while self.said_at.len() > FLOOD_MAX_MESSAGES as usize {
            self.said_at.pop_front();
        }
        FloodVerdict::Allowed
    }
}
