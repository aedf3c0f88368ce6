use serde::Deserialize;

use super::{Ack, impl_status};

/// The `smartlife.iot.dimmer` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dimmer {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_dimmer_parameters: Option<DimmerParameters>,
    pub set_brightness: Option<Ack>,
    pub set_fade_on_time: Option<Ack>,
    pub set_fade_off_time: Option<Ack>,
    pub set_gentle_on_time: Option<Ack>,
    pub set_gentle_off_time: Option<Ack>,
}

/// Fade and threshold settings; times are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimmerParameters {
    pub min_threshold: u16,
    pub fade_on_time: u32,
    pub fade_off_time: u32,
    pub gentle_on_time: u32,
    pub gentle_off_time: u32,
    pub ramp_rate: u16,
    #[serde(rename = "bulb_type")]
    pub bulb_type: u8,
    #[serde(rename = "err_code")]
    pub err_code: i64,
    #[serde(rename = "err_msg")]
    pub err_msg: Option<String>,
}

impl_status!(Dimmer, DimmerParameters);
