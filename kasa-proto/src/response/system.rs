use serde::Deserialize;

use super::{Ack, impl_status};

/// The `system` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct System {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_sysinfo: Option<Sysinfo>,
    pub set_relay_state: Option<Ack>,
    pub set_led_off: Option<Ack>,
    pub set_dev_alias: Option<Ack>,
    pub set_mode: Option<Ack>,
    pub reboot: Option<Ack>,
}

/// `system.get_sysinfo` result.
///
/// Plugs, dimmers and strips report overlapping subsets of these fields;
/// anything a model leaves out keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sysinfo {
    pub sw_ver: String,
    pub hw_ver: String,
    pub model: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "oemId")]
    pub oem_id: String,
    #[serde(rename = "hwId")]
    pub hw_id: String,
    pub rssi: i32,
    #[serde(rename = "longitude_i")]
    pub longitude: i64,
    #[serde(rename = "latitude_i")]
    pub latitude: i64,
    pub alias: String,
    pub status: String,
    pub mic_type: String,
    pub feature: String,
    #[serde(alias = "mic_mac")]
    pub mac: String,
    pub updating: u8,
    pub led_off: u8,
    pub relay_state: u8,
    pub brightness: u8,
    pub on_time: i64,
    pub active_mode: String,
    pub dev_name: String,
    pub children: Vec<Child>,
    #[serde(rename = "child_num")]
    pub num_children: u8,
    pub ntc_state: i32,
    pub preferred_state: Vec<Preset>,
    #[serde(alias = "error_code")]
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl Sysinfo {
    pub fn is_on(&self) -> bool {
        self.relay_state == 1
    }

    /// Strips and multi-outlet plugs report their outlets as children.
    pub fn is_multi_outlet(&self) -> bool {
        self.num_children > 0 || !self.children.is_empty()
    }

    /// Full child id as expected in a `child_ids` context.
    ///
    /// Some firmware reports only the two-digit outlet suffix, in which case
    /// the device id is prepended.
    pub fn child_id(&self, child: &Child) -> String {
        if child.id.len() <= 2 {
            format!("{}{}", self.device_id, child.id)
        } else {
            child.id.clone()
        }
    }
}

/// One outlet of a multi-outlet device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Child {
    pub id: String,
    #[serde(rename = "state")]
    pub relay_state: u8,
    pub alias: String,
    pub on_time: i64,
}

/// Stored brightness preset on dimmers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub index: u8,
    pub brightness: u8,
}

impl_status!(System, Sysinfo);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Envelope, Status};

    const HS300: &str = r#"{"system":{"get_sysinfo":{"sw_ver":"1.0.6 Build 200821 Rel.090909","hw_ver":"1.0","model":"HS300(US)","deviceId":"8006ABCDEF","oemId":"OEM","hwId":"HW","rssi":-49,"latitude_i":0,"longitude_i":0,"alias":"Strip","status":"new","mic_type":"IOT.SMARTPLUGSWITCH","feature":"TIM:ENE","mac":"AA:BB:CC:DD:EE:FF","updating":0,"led_off":0,"children":[{"id":"8006ABCDEF00","state":1,"alias":"Lamp","on_time":120,"next_action":{"type":-1}},{"id":"01","state":0,"alias":"Fan","on_time":0,"next_action":{"type":-1}}],"child_num":2,"ntc_state":0,"err_code":0}}}"#;

    #[test]
    fn test_strip_sysinfo() {
        let envelope = Envelope::parse(HS300.as_bytes()).unwrap();
        let info = envelope.system.unwrap().get_sysinfo.unwrap().check().unwrap();
        assert_eq!(info.model, "HS300(US)");
        assert_eq!(info.rssi, -49);
        assert!(info.is_multi_outlet());
        assert_eq!(info.children.len(), 2);
        assert_eq!(info.children[0].relay_state, 1);
        assert_eq!(info.child_id(&info.children[0]), "8006ABCDEF00");
        assert_eq!(info.child_id(&info.children[1]), "8006ABCDEF01");
    }

    #[test]
    fn test_dimmer_sysinfo() {
        let json = r#"{"system":{"get_sysinfo":{"model":"HS220(US)","alias":"Hall","relay_state":1,"brightness":40,"mic_mac":"112233445566","preferred_state":[{"index":0,"brightness":100},{"index":1,"brightness":75}],"err_code":0}}}"#;
        let info = Envelope::parse(json.as_bytes())
            .unwrap()
            .system
            .unwrap()
            .get_sysinfo
            .unwrap();
        assert!(info.is_on());
        assert!(!info.is_multi_outlet());
        assert_eq!(info.brightness, 40);
        assert_eq!(info.mac, "112233445566");
        assert_eq!(info.preferred_state[1], Preset { index: 1, brightness: 75 });
    }
}
