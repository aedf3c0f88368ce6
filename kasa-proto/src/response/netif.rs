use serde::Deserialize;

use super::{Ack, impl_status};

/// The `netif` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Netif {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_stainfo: Option<StaInfo>,
    pub set_stainfo: Option<Ack>,
}

/// Wi-Fi station status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaInfo {
    pub ssid: String,
    pub key_type: i32,
    pub rssi: i32,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl_status!(Netif, StaInfo);
