//! Typed command catalog.
//!
//! Every command is a `{ "<module>": { "<action>": { ...params } } }`
//! document. Commands are values here and are serialized through
//! `serde_json`, so aliases, SSIDs and passwords are always escaped.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Value, json};

use crate::error::{ProtoError, Result};

/// Module keys as they appear on the wire.
pub mod module {
    pub const SYSTEM: &str = "system";
    pub const EMETER: &str = "emeter";
    pub const NETIF: &str = "netif";
    pub const DIMMER: &str = "smartlife.iot.dimmer";
    pub const SCHEDULE: &str = "smartlife.iot.common.schedule";
    pub const COUNTDOWN: &str = "count_down";
    pub const CLOUD: &str = "cnCloud";
}

/// Brightness accepted by dimmers, in percent.
pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<u8> = 0..=100;

/// Countdown rule delay accepted by devices, in seconds.
pub const COUNTDOWN_DELAY_RANGE: std::ops::RangeInclusive<u32> = 1..=3600;

/// A single module/action request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetSysinfo,
    SetRelayState(bool),
    /// Reboots after `delay` seconds.
    Reboot { delay: u32 },
    /// `true` turns the status LED off.
    SetLedOff(bool),
    SetAlias(String),
    /// Target mode, e.g. `"none"` or `"count_down"`.
    SetMode(String),

    GetEmeterRealtime,
    GetEmeterDaystat { month: u8, year: u16 },
    GetEmeterMonthstat { year: u16 },
    GetEmeterGain,
    SetEmeterGain { vgain: u32, igain: u32 },
    StartEmeterCalibration { vtarget: u32, itarget: u32 },
    EraseEmeterStats,

    GetStaInfo,
    /// Joins the device to a Wi-Fi network. `key_type` 3 is WPA2.
    SetStaInfo {
        ssid: String,
        password: String,
        key_type: u8,
    },

    GetDimmerParameters,
    SetBrightness(u8),
    /// Fade durations in milliseconds.
    SetFadeOnTime(u32),
    SetFadeOffTime(u32),
    SetGentleOnTime(u32),
    SetGentleOffTime(u32),

    GetScheduleRules,

    GetCountdownRules,
    DeleteAllCountdownRules,
    /// Switches the relay to `turn_on` after `delay` seconds.
    AddCountdownRule {
        delay: u32,
        turn_on: bool,
        name: String,
    },

    CloudUnbind,
    CloudBind { username: String, password: String },
    /// Bare hostname, no scheme.
    SetCloudServer(String),
}

impl Command {
    /// Top-level module key this command addresses.
    pub fn module(&self) -> &'static str {
        use Command::*;
        match self {
            GetSysinfo | SetRelayState(_) | Reboot { .. } | SetLedOff(_) | SetAlias(_)
            | SetMode(_) => module::SYSTEM,
            GetEmeterRealtime
            | GetEmeterDaystat { .. }
            | GetEmeterMonthstat { .. }
            | GetEmeterGain
            | SetEmeterGain { .. }
            | StartEmeterCalibration { .. }
            | EraseEmeterStats => module::EMETER,
            GetStaInfo | SetStaInfo { .. } => module::NETIF,
            GetDimmerParameters
            | SetBrightness(_)
            | SetFadeOnTime(_)
            | SetFadeOffTime(_)
            | SetGentleOnTime(_)
            | SetGentleOffTime(_) => module::DIMMER,
            GetScheduleRules => module::SCHEDULE,
            GetCountdownRules | DeleteAllCountdownRules | AddCountdownRule { .. } => {
                module::COUNTDOWN
            }
            CloudUnbind | CloudBind { .. } | SetCloudServer(_) => module::CLOUD,
        }
    }

    /// Action key inside the module object.
    pub fn action(&self) -> &'static str {
        use Command::*;
        match self {
            GetSysinfo => "get_sysinfo",
            SetRelayState(_) => "set_relay_state",
            Reboot { .. } => "reboot",
            SetLedOff(_) => "set_led_off",
            SetAlias(_) => "set_dev_alias",
            SetMode(_) => "set_mode",
            GetEmeterRealtime => "get_realtime",
            GetEmeterDaystat { .. } => "get_daystat",
            GetEmeterMonthstat { .. } => "get_monthstat",
            GetEmeterGain => "get_vgain_igain",
            SetEmeterGain { .. } => "set_vgain_igain",
            StartEmeterCalibration { .. } => "start_calibration",
            EraseEmeterStats => "erase_emeter_stat",
            GetStaInfo => "get_stainfo",
            SetStaInfo { .. } => "set_stainfo",
            GetDimmerParameters => "get_dimmer_parameters",
            SetBrightness(_) => "set_brightness",
            SetFadeOnTime(_) => "set_fade_on_time",
            SetFadeOffTime(_) => "set_fade_off_time",
            SetGentleOnTime(_) => "set_gentle_on_time",
            SetGentleOffTime(_) => "set_gentle_off_time",
            GetScheduleRules | GetCountdownRules => "get_rules",
            DeleteAllCountdownRules => "delete_all_rules",
            AddCountdownRule { .. } => "add_rule",
            CloudUnbind => "unbind",
            CloudBind { .. } => "bind",
            SetCloudServer(_) => "set_server_url",
        }
    }

    /// Parameter object for the action. Some actions take `null`.
    pub fn params(&self) -> Value {
        use Command::*;
        match self {
            GetSysinfo | GetEmeterRealtime | GetEmeterGain | GetStaInfo | GetDimmerParameters
            | GetScheduleRules | GetCountdownRules | DeleteAllCountdownRules => json!({}),
            EraseEmeterStats | CloudUnbind => Value::Null,
            SetRelayState(on) => json!({ "state": u8::from(*on) }),
            Reboot { delay } => json!({ "delay": delay }),
            SetLedOff(off) => json!({ "off": u8::from(*off) }),
            SetAlias(alias) => json!({ "alias": alias }),
            SetMode(mode) => json!({ "mode": mode }),
            GetEmeterDaystat { month, year } => json!({ "month": month, "year": year }),
            GetEmeterMonthstat { year } => json!({ "year": year }),
            SetEmeterGain { vgain, igain } => json!({ "vgain": vgain, "igain": igain }),
            StartEmeterCalibration { vtarget, itarget } => {
                json!({ "vtarget": vtarget, "itarget": itarget })
            }
            SetStaInfo {
                ssid,
                password,
                key_type,
            } => json!({ "ssid": ssid, "password": password, "key_type": key_type }),
            SetBrightness(brightness) => json!({ "brightness": brightness }),
            SetFadeOnTime(ms) | SetFadeOffTime(ms) | SetGentleOnTime(ms) | SetGentleOffTime(ms) => {
                json!({ "fadeTime": ms })
            }
            AddCountdownRule {
                delay,
                turn_on,
                name,
            } => json!({
                "enable": 1,
                "delay": delay,
                "act": u8::from(*turn_on),
                "name": name,
            }),
            CloudBind { username, password } => {
                json!({ "username": username, "password": password })
            }
            SetCloudServer(server) => json!({ "server": server }),
        }
    }

    /// Checks parameters against the ranges devices accept.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::SetBrightness(b) if !BRIGHTNESS_RANGE.contains(b) => {
                Err(ProtoError::InvalidParameter {
                    name: "brightness",
                    reason: format!("{b} is outside 0-100"),
                })
            }
            Command::AddCountdownRule { delay, .. } if !COUNTDOWN_DELAY_RANGE.contains(delay) => {
                Err(ProtoError::InvalidParameter {
                    name: "delay",
                    reason: format!("{delay} is outside 1-3600 seconds"),
                })
            }
            Command::GetEmeterDaystat { month, .. } if !(1..=12).contains(month) => {
                Err(ProtoError::InvalidParameter {
                    name: "month",
                    reason: format!("{month} is outside 1-12"),
                })
            }
            Command::SetStaInfo { ssid, .. } if ssid.is_empty() => {
                Err(ProtoError::InvalidParameter {
                    name: "ssid",
                    reason: "must not be empty".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether the device sends a reply worth reading for this command.
    pub fn is_query(&self) -> bool {
        self.action().starts_with("get_")
    }
}

/// A command as sent on the wire, optionally scoped to child relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    children: Vec<String>,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            children: Vec::new(),
        }
    }

    /// Scopes the request to one more child relay.
    pub fn child(mut self, id: impl Into<String>) -> Self {
        self.children.push(id.into());
        self
    }

    /// Scopes the request to several child relays at once.
    pub fn children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn child_ids(&self) -> &[String] {
        &self.children
    }

    /// Validates and serializes the request to its JSON text.
    pub fn to_json(&self) -> Result<String> {
        self.command.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        Self::new(command)
    }
}

struct Context<'a> {
    child_ids: &'a [String],
}

impl Serialize for Context<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("child_ids", self.child_ids)?;
        map.end()
    }
}

struct Action<'a>(&'a Command);

impl Serialize for Action<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.action(), &self.0.params())?;
        map.end()
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.children.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.children.is_empty() {
            map.serialize_entry(
                "context",
                &Context {
                    child_ids: &self.children,
                },
            )?;
        }
        map.serialize_entry(self.command.module(), &Action(&self.command))?;
        map.end()
    }
}
