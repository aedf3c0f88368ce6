//! Response envelope and per-module records.
//!
//! A reply mirrors the request: one top-level key per queried module, each
//! carrying an `err_code`/`err_msg` pair and, on success, one object per
//! action. Every module is optional in [`Envelope`], so a module that was not
//! queried (`None`) stays distinguishable from one that answered with an
//! error (`Some` with a non-zero `err_code`).

mod cloud;
mod countdown;
mod dimmer;
mod emeter;
mod netif;
mod system;

pub use cloud::{Cloud, Schedule, ScheduleRules};
pub use countdown::{AddRuleResult, Countdown, CountdownRules, Rule};
pub use dimmer::{Dimmer, DimmerParameters};
pub use emeter::{Emeter, EmeterDay, EmeterDaystat, EmeterGain, EmeterMonth, EmeterMonthstat, EmeterRealtime};
pub use netif::{Netif, StaInfo};
pub use system::{Child, Preset, Sysinfo, System};

use serde::Deserialize;

use crate::error::{ProtoError, Result};

/// Decoded reply document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    pub system: Option<System>,
    #[serde(rename = "smartlife.iot.dimmer")]
    pub dimmer: Option<Dimmer>,
    pub netif: Option<Netif>,
    #[serde(rename = "count_down")]
    pub countdown: Option<Countdown>,
    pub emeter: Option<Emeter>,
    #[serde(rename = "cnCloud")]
    pub cloud: Option<Cloud>,
    #[serde(rename = "smartlife.iot.common.schedule")]
    pub schedule: Option<Schedule>,
}

impl Envelope {
    /// Parses an unscrambled reply.
    pub fn parse(plaintext: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(plaintext)?)
    }
}

/// Common `err_code`/`err_msg` accessors shared by modules and records.
pub trait Status: Sized {
    fn err_code(&self) -> i64;

    fn err_msg(&self) -> Option<&str>;

    fn is_ok(&self) -> bool {
        self.err_code() == 0
    }

    /// Converts a non-zero `err_code` into [`ProtoError::Device`].
    fn check(self) -> Result<Self> {
        if self.is_ok() {
            return Ok(self);
        }
        Err(ProtoError::Device {
            code: self.err_code(),
            message: self.err_msg().unwrap_or_default().to_string(),
        })
    }
}

macro_rules! impl_status {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::response::Status for $ty {
                fn err_code(&self) -> i64 {
                    self.err_code
                }

                fn err_msg(&self) -> Option<&str> {
                    self.err_msg.as_deref()
                }
            }
        )*
    };
}
pub(crate) use impl_status;

/// Result of a set-style action that returns nothing but its status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl_status!(Ack);

/// Unwraps a module and one of its actions, checking both status codes.
///
/// `module` and `action` are the wire names used in the error when either
/// level is absent.
pub fn extract<M, A, F>(
    module: Option<M>,
    module_name: &'static str,
    action_name: &'static str,
    action: F,
) -> Result<A>
where
    M: Status,
    A: Status,
    F: FnOnce(M) -> Option<A>,
{
    let module = module.ok_or(ProtoError::Missing(module_name))?.check()?;
    action(module).ok_or(ProtoError::Missing(action_name))?.check()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_module_is_none() {
        let envelope = Envelope::parse(br#"{"system":{"get_sysinfo":{"alias":"Porch"}}}"#).unwrap();
        assert!(envelope.system.is_some());
        assert!(envelope.emeter.is_none());
        assert!(envelope.dimmer.is_none());
    }

    #[test]
    fn test_module_error_is_present() {
        let envelope =
            Envelope::parse(br#"{"emeter":{"err_code":-1,"err_msg":"module not support"}}"#)
                .unwrap();
        let emeter = envelope.emeter.unwrap();
        assert!(!emeter.is_ok());
        assert_eq!(emeter.err_msg(), Some("module not support"));
        assert!(emeter.get_realtime.is_none());
    }

    #[test]
    fn test_check_surfaces_device_error() {
        let envelope =
            Envelope::parse(br#"{"smartlife.iot.dimmer":{"err_code":-2,"err_msg":"member not support"}}"#)
                .unwrap();
        match envelope.dimmer.unwrap().check() {
            Err(ProtoError::Device { code, message }) => {
                assert_eq!(code, -2);
                assert_eq!(message, "member not support");
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_nested() {
        let envelope = Envelope::parse(
            br#"{"netif":{"get_stainfo":{"ssid":"IoT8417","key_type":3,"rssi":-61,"err_code":0}}}"#,
        )
        .unwrap();
        let sta = extract(envelope.netif, "netif", "get_stainfo", |m| m.get_stainfo).unwrap();
        assert_eq!(sta.ssid, "IoT8417");
        assert_eq!(sta.rssi, -61);
    }

    #[test]
    fn test_extract_missing_action() {
        let envelope = Envelope::parse(br#"{"netif":{}}"#).unwrap();
        let err = extract(envelope.netif, "netif", "get_stainfo", |m| m.get_stainfo).unwrap_err();
        assert!(matches!(err, ProtoError::Missing("get_stainfo")));
    }

    #[test]
    fn test_unknown_modules_ignored() {
        let envelope = Envelope::parse(br#"{"smartlife.iot.LAS":{"err_code":0}}"#).unwrap();
        assert!(envelope.system.is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Envelope::parse(b"not json"), Err(ProtoError::Json(_))));
    }
}
