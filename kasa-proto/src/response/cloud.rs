use serde::Deserialize;
use serde_json::Value;

use super::{Ack, impl_status};

/// The `cnCloud` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cloud {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub bind: Option<Ack>,
    pub unbind: Option<Ack>,
    pub set_server_url: Option<Ack>,
}

/// The `smartlife.iot.common.schedule` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_rules: Option<ScheduleRules>,
}

/// Schedule rules are kept as raw JSON; their shape varies by firmware.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleRules {
    pub enable: u8,
    pub version: u32,
    pub rule_list: Vec<Value>,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl_status!(Cloud, Schedule, ScheduleRules);
