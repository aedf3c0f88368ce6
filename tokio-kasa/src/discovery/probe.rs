//! Probe variants: which command to broadcast and which part of each reply
//! to keep.

use kasa_proto::response::{self, DimmerParameters, EmeterRealtime, StaInfo, Sysinfo};
use kasa_proto::{Command, Envelope};

/// A discovery probe.
pub trait Probe {
    /// Record kept per responding device.
    type Output;

    /// Command broadcast on every probe round.
    fn command(&self) -> Command;

    /// Picks the probe's result out of a reply.
    ///
    /// Returns `None` when the module or action is missing, or when either
    /// reports a non-zero `err_code`; such replies are dropped.
    fn extract(&self, envelope: Envelope) -> Option<Self::Output>;
}

/// General device information (`system.get_sysinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProbe;

impl Probe for SysinfoProbe {
    type Output = Sysinfo;

    fn command(&self) -> Command {
        Command::GetSysinfo
    }

    fn extract(&self, envelope: Envelope) -> Option<Sysinfo> {
        response::extract(envelope.system, "system", "get_sysinfo", |m| m.get_sysinfo).ok()
    }
}

/// Dimmer fade and threshold settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimmerProbe;

impl Probe for DimmerProbe {
    type Output = DimmerParameters;

    fn command(&self) -> Command {
        Command::GetDimmerParameters
    }

    fn extract(&self, envelope: Envelope) -> Option<DimmerParameters> {
        response::extract(
            envelope.dimmer,
            "smartlife.iot.dimmer",
            "get_dimmer_parameters",
            |m| m.get_dimmer_parameters,
        )
        .ok()
    }
}

/// Wi-Fi station status. Useful for watching a flaky device's signal over
/// time.
#[derive(Debug, Clone, Copy, Default)]
pub struct WifiProbe;

impl Probe for WifiProbe {
    type Output = StaInfo;

    fn command(&self) -> Command {
        Command::GetStaInfo
    }

    fn extract(&self, envelope: Envelope) -> Option<StaInfo> {
        response::extract(envelope.netif, "netif", "get_stainfo", |m| m.get_stainfo).ok()
    }
}

/// Energy-meter realtime readings. Devices without a meter answer
/// `module not support` and are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmeterProbe;

impl Probe for EmeterProbe {
    type Output = EmeterRealtime;

    fn command(&self) -> Command {
        Command::GetEmeterRealtime
    }

    fn extract(&self, envelope: Envelope) -> Option<EmeterRealtime> {
        response::extract(envelope.emeter, "emeter", "get_realtime", |m| m.get_realtime).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Envelope {
        Envelope::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_sysinfo_extracted() {
        let info = SysinfoProbe
            .extract(parse(r#"{"system":{"get_sysinfo":{"alias":"Porch","model":"HS200(US)","err_code":0}}}"#))
            .unwrap();
        assert_eq!(info.alias, "Porch");
    }

    #[test]
    fn test_unsupported_module_dropped() {
        let reply = parse(r#"{"emeter":{"err_code":-1,"err_msg":"module not support"}}"#);
        assert!(EmeterProbe.extract(reply).is_none());
    }

    #[test]
    fn test_action_error_dropped() {
        let reply = parse(r#"{"emeter":{"get_realtime":{"err_code":-3,"err_msg":"busy"}}}"#);
        assert!(EmeterProbe.extract(reply).is_none());
    }

    #[test]
    fn test_other_module_dropped() {
        let reply = parse(r#"{"system":{"get_sysinfo":{"alias":"Porch"}}}"#);
        assert!(DimmerProbe.extract(reply.clone()).is_none());
        assert!(WifiProbe.extract(reply).is_none());
    }

    #[test]
    fn test_wifi_extracted() {
        let sta = WifiProbe
            .extract(parse(r#"{"netif":{"get_stainfo":{"ssid":"IoT8417","key_type":3,"rssi":-61,"err_code":0}}}"#))
            .unwrap();
        assert_eq!(sta.key_type, 3);
    }

    #[test]
    fn test_commands() {
        assert_eq!(SysinfoProbe.command(), Command::GetSysinfo);
        assert_eq!(DimmerProbe.command(), Command::GetDimmerParameters);
        assert_eq!(WifiProbe.command(), Command::GetStaInfo);
        assert_eq!(EmeterProbe.command(), Command::GetEmeterRealtime);
    }
}
