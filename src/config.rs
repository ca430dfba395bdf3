//! Typed configuration surface (§0.4 / §6's directive table).
//!
//! This crate does not parse a configuration file or command line (that's
//! an excluded external collaborator, §1's Non-goals). What it does own is
//! the typed shape that collaborator populates: plain, `serde`-deserializable
//! structs mirroring the `monitor`/`defaultMonitors`/`linkUpDownNotifications`/
//! `notificationEvent`/`setEvent`/`override`/`setserialno` directives, which
//! [`crate::agent::Agent::apply_config`] consumes to seed the registry and
//! event engine.

use serde::{Deserialize, Serialize};

use crate::oid::Oid;
use crate::value::Value;

/// `monitor <trigger-spec>`: create or enable a user trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSpec {
    pub owner: String,
    pub name: String,
    pub monitored_oid: Oid,
    pub wildcarded: bool,
    pub frequency_secs: u64,
    pub test: MonitorTestSpec,
    pub delta: bool,
    pub discontinuity_oid: Option<Oid>,
    pub objects: Vec<Oid>,
    pub generic_event: Option<(String, String)>,
    pub rising_event: Option<(String, String)>,
    pub falling_event: Option<(String, String)>,
}

/// The type-specific predicate parameters a `monitor` directive configures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MonitorTestSpec {
    Existence {
        present: bool,
        absent: bool,
        changed: bool,
        startup: bool,
    },
    Boolean {
        operator: BooleanOperatorSpec,
        operand: i64,
        startup: bool,
    },
    Threshold {
        rising: i64,
        falling: i64,
        delta: bool,
    },
}

/// Wire/config form of [`crate::eventmib::trigger::BooleanOp`], kept
/// separate so the predicate module has no `serde` dependency of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOperatorSpec {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// `defaultMonitors yes|no`: install the built-in table-watching triggers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DefaultMonitors(pub bool);

/// `linkUpDownNotifications yes|no`: install linkUp/linkDown triggers on
/// `ifOperStatus`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkUpDownNotifications(pub bool);

/// `notificationEvent <event-spec>`: a named notification event with a
/// payload-OID list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEventSpec {
    pub owner: String,
    pub name: String,
    pub trap_oid: Oid,
    pub strict_order: bool,
}

/// `setEvent <name> [-I] <oid>=<value>`: a named SET event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEventSpec {
    pub owner: String,
    pub name: String,
    pub target_oid: Oid,
    pub value: Value,
    /// `-I`: append the firing instance's suffix to `target_oid`.
    pub append_instance_suffix: bool,
}

/// `override [-rw] <oid> <type> <value>`: register a constant (or RW) leaf
/// shadowing another registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideSpec {
    pub oid: Oid,
    pub value: Value,
    pub writable: bool,
}

/// `setserialno <int>`: seed the TestAndIncr scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetSerialNo(pub i32);

/// The full set of directives a caller (or config-file parser) hands to
/// [`crate::agent::Agent::apply_config`] in one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    pub monitors: Vec<MonitorSpec>,
    pub default_monitors: DefaultMonitors,
    pub link_up_down_notifications: LinkUpDownNotifications,
    pub notification_events: Vec<NotificationEventSpec>,
    pub set_events: Vec<SetEventSpec>,
    pub overrides: Vec<OverrideSpec>,
    pub serial_no: Option<SetSerialNo>,
}
