use serde::Deserialize;

use super::{Ack, impl_status};

/// The `emeter` module.
///
/// Devices without a meter answer with `err_code: -1` and
/// `"module not support"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Emeter {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_realtime: Option<EmeterRealtime>,
    pub get_daystat: Option<EmeterDaystat>,
    pub get_monthstat: Option<EmeterMonthstat>,
    pub get_vgain_igain: Option<EmeterGain>,
    pub set_vgain_igain: Option<Ack>,
    pub start_calibration: Option<Ack>,
    pub erase_emeter_stat: Option<Ack>,
}

/// Instantaneous readings. Strips add a `slot_id` per outlet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterRealtime {
    pub slot_id: u8,
    pub current_ma: u64,
    pub voltage_mv: u64,
    pub power_mw: u64,
    pub total_wh: u64,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterDaystat {
    pub day_list: Vec<EmeterDay>,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterDay {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub energy_wh: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterMonthstat {
    pub month_list: Vec<EmeterMonth>,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterMonth {
    pub year: u16,
    pub month: u8,
    pub energy_wh: u64,
}

/// Calibration gains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmeterGain {
    pub vgain: u64,
    pub igain: u64,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl_status!(Emeter, EmeterRealtime, EmeterDaystat, EmeterMonthstat, EmeterGain);
