// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for group buying
//!
//! # Subject Pattern
//!
//! ```text
//! groupbuy.{channel}.{token}
//! ```
//!
//! - `groupbuy.notifications.{user_id}` - per-user threshold notifications
//! - `groupbuy.sweep.trigger` - on-demand expiry sweep
//! - `groupbuy.commands.{operation}` - request-reply intake (`create_or_join`,
//!   `join`, `get_active_for_product`, `get_for_user`)
//!
//! # Examples
//!
//! ```rust
//! use group_buy_engine::subjects::{Channel, SubjectBuilder};
//!
//! let subject = SubjectBuilder::new(Channel::Sweep).token("trigger").build();
//! assert_eq!(subject, "groupbuy.sweep.trigger");
//!
//! let wildcard = SubjectBuilder::new(Channel::Notifications).build_wildcard();
//! assert_eq!(wildcard, "groupbuy.notifications.>");
//! ```

use std::fmt;

use crate::domain::UserId;

/// Root namespace for all group buying subjects
pub const GROUP_BUY_ROOT: &str = "groupbuy";

/// Top-level channels under the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Participant notifications
    Notifications,
    /// Expiry sweep control
    Sweep,
    /// Command intake
    Commands,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Notifications => write!(f, "notifications"),
            Channel::Sweep => write!(f, "sweep"),
            Channel::Commands => write!(f, "commands"),
        }
    }
}

/// Builder for group buying subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    channel: Channel,
    tokens: Vec<String>,
}

impl SubjectBuilder {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            tokens: Vec::new(),
        }
    }

    /// Append a token; `.` separators inside the token are replaced so one
    /// id never spans several subject levels
    pub fn token(mut self, token: impl AsRef<str>) -> Self {
        self.tokens.push(sanitize(token.as_ref()));
        self
    }

    /// `groupbuy.{channel}[.{token}...]`
    pub fn build(self) -> String {
        let mut subject = format!("{}.{}", GROUP_BUY_ROOT, self.channel);
        for token in self.tokens {
            subject.push('.');
            subject.push_str(&token);
        }
        subject
    }

    /// `groupbuy.{channel}[.{token}...].>`
    pub fn build_wildcard(self) -> String {
        format!("{}.>", self.build())
    }
}

fn sanitize(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            '.' | '*' | '>' | ' ' => '_',
            c => c,
        })
        .collect()
}

/// Subject a user's notifications are published on
pub fn notification_subject(user_id: &UserId) -> String {
    SubjectBuilder::new(Channel::Notifications)
        .token(user_id.as_str())
        .build()
}

/// Subject that triggers an expiry sweep
pub fn sweep_trigger() -> String {
    SubjectBuilder::new(Channel::Sweep).token("trigger").build()
}

/// Request-reply subject for `create_or_join`
pub fn create_or_join_command() -> String {
    command_subject("create_or_join")
}

/// Request-reply subject for joining a specific opportunity
pub fn join_command() -> String {
    command_subject("join")
}

/// Request-reply subject listing a product's open opportunities
pub fn get_active_for_product_query() -> String {
    command_subject("get_active_for_product")
}

/// Request-reply subject listing the opportunities a user joined
pub fn get_for_user_query() -> String {
    command_subject("get_for_user")
}

fn command_subject(operation: &str) -> String {
    SubjectBuilder::new(Channel::Commands).token(operation).build()
}
