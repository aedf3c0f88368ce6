//! Typed operations against a single device.

use std::net::{IpAddr, Ipv4Addr};

use bytes::Bytes;
use kasa_proto::response::{
    self, CountdownRules, DimmerParameters, EmeterDaystat, EmeterGain, EmeterMonthstat,
    EmeterRealtime, ScheduleRules, StaInfo, Sysinfo,
};
use kasa_proto::{Command, Envelope, Request};
use tracing::debug;

use crate::constants::DEFAULT_PORT;
use crate::error::Result;
use crate::transport::{self, Mode, StreamConfig};

/// Per-device settings.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub port: u16,
    /// Timing of stream requests.
    pub stream: StreamConfig,
    /// Scopes every command to one outlet of a multi-outlet device.
    pub child_id: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            stream: StreamConfig::default(),
            child_id: None,
        }
    }
}

/// A device addressed by IPv4 address.
///
/// Queries go over TCP and return typed records. Commands whose reply nobody
/// reads go over UDP and return as soon as the datagram is sent.
#[derive(Debug, Clone)]
pub struct Device {
    host: String,
    ip: Ipv4Addr,
    config: DeviceConfig,
}

impl Device {
    /// Resolves `host` (a hostname or dotted quad) with default settings.
    pub async fn resolve(host: &str) -> Result<Self> {
        Self::resolve_with_config(host, DeviceConfig::default()).await
    }

    pub async fn resolve_with_config(host: &str, config: DeviceConfig) -> Result<Self> {
        let ip = transport::resolve_ipv4(host).await?;
        debug!(host, %ip, "resolved device");
        Ok(Self {
            host: host.to_string(),
            ip,
            config,
        })
    }

    pub fn from_ip(ip: Ipv4Addr, config: DeviceConfig) -> Self {
        Self {
            host: ip.to_string(),
            ip,
            config,
        }
    }

    /// Returns a handle scoped to one outlet of this device.
    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut device = self.clone();
        device.config.child_id = Some(id.into());
        device
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn request(&self, command: Command) -> Request {
        let request = Request::new(command);
        match &self.config.child_id {
            Some(id) => request.child(id.as_str()),
            None => request,
        }
    }

    /// Sends raw JSON text and returns the unscrambled reply, which is empty
    /// in [`Mode::Datagram`].
    pub async fn raw(&self, json: &str, mode: Mode) -> Result<Bytes> {
        transport::send_request(
            IpAddr::V4(self.ip),
            self.config.port,
            json.as_bytes(),
            mode,
            &self.config.stream,
        )
        .await
    }

    /// Sends `command` over TCP and decodes the reply envelope.
    pub async fn query(&self, command: Command) -> Result<Envelope> {
        let json = self.request(command).to_json()?;
        debug!(ip = %self.ip, %json, "query");
        let reply = self.raw(&json, Mode::Stream).await?;
        Ok(Envelope::parse(&reply)?)
    }

    /// Sends `command` over UDP without waiting for a reply.
    pub async fn send(&self, command: Command) -> Result<()> {
        let json = self.request(command).to_json()?;
        debug!(ip = %self.ip, %json, "send");
        self.raw(&json, Mode::Datagram).await?;
        Ok(())
    }

    pub async fn get_sysinfo(&self) -> Result<Sysinfo> {
        let envelope = self.query(Command::GetSysinfo).await?;
        Ok(response::extract(envelope.system, "system", "get_sysinfo", |m| m.get_sysinfo)?)
    }

    pub async fn get_emeter_realtime(&self) -> Result<EmeterRealtime> {
        let envelope = self.query(Command::GetEmeterRealtime).await?;
        Ok(response::extract(envelope.emeter, "emeter", "get_realtime", |m| m.get_realtime)?)
    }

    /// Daily energy totals for one month.
    pub async fn get_emeter_daystat(&self, month: u8, year: u16) -> Result<EmeterDaystat> {
        let envelope = self.query(Command::GetEmeterDaystat { month, year }).await?;
        Ok(response::extract(envelope.emeter, "emeter", "get_daystat", |m| m.get_daystat)?)
    }

    /// Monthly energy totals for one year.
    pub async fn get_emeter_monthstat(&self, year: u16) -> Result<EmeterMonthstat> {
        let envelope = self.query(Command::GetEmeterMonthstat { year }).await?;
        Ok(response::extract(envelope.emeter, "emeter", "get_monthstat", |m| m.get_monthstat)?)
    }

    pub async fn get_emeter_gain(&self) -> Result<EmeterGain> {
        let envelope = self.query(Command::GetEmeterGain).await?;
        Ok(response::extract(envelope.emeter, "emeter", "get_vgain_igain", |m| {
            m.get_vgain_igain
        })?)
    }

    pub async fn get_wifi_status(&self) -> Result<StaInfo> {
        let envelope = self.query(Command::GetStaInfo).await?;
        Ok(response::extract(envelope.netif, "netif", "get_stainfo", |m| m.get_stainfo)?)
    }

    pub async fn get_dimmer_parameters(&self) -> Result<DimmerParameters> {
        let envelope = self.query(Command::GetDimmerParameters).await?;
        Ok(response::extract(
            envelope.dimmer,
            "smartlife.iot.dimmer",
            "get_dimmer_parameters",
            |m| m.get_dimmer_parameters,
        )?)
    }

    pub async fn get_schedule_rules(&self) -> Result<ScheduleRules> {
        let envelope = self.query(Command::GetScheduleRules).await?;
        Ok(response::extract(
            envelope.schedule,
            "smartlife.iot.common.schedule",
            "get_rules",
            |m| m.get_rules,
        )?)
    }

    pub async fn get_countdown_rules(&self) -> Result<CountdownRules> {
        let envelope = self.query(Command::GetCountdownRules).await?;
        Ok(response::extract(envelope.countdown, "count_down", "get_rules", |m| m.get_rules)?)
    }

    /// Switches the device mode, e.g. to `"count_down"` before adding a
    /// countdown rule. Waits for the acknowledgement.
    pub async fn set_mode(&self, mode: impl Into<String>) -> Result<()> {
        let envelope = self.query(Command::SetMode(mode.into())).await?;
        response::extract(envelope.system, "system", "set_mode", |m| m.set_mode)?;
        Ok(())
    }

    pub async fn set_relay_state(&self, on: bool) -> Result<()> {
        self.send(Command::SetRelayState(on)).await
    }

    /// Switches several outlets of a strip in one command, regardless of the
    /// configured child id.
    pub async fn set_children_relay_state<I, S>(&self, ids: I, on: bool) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let json = Request::new(Command::SetRelayState(on)).children(ids).to_json()?;
        debug!(ip = %self.ip, %json, "send");
        self.raw(&json, Mode::Datagram).await?;
        Ok(())
    }

    /// Brightness in percent, 0 to 100.
    pub async fn set_brightness(&self, brightness: u8) -> Result<()> {
        self.send(Command::SetBrightness(brightness)).await
    }

    pub async fn set_fade_on_time(&self, ms: u32) -> Result<()> {
        self.send(Command::SetFadeOnTime(ms)).await
    }

    pub async fn set_fade_off_time(&self, ms: u32) -> Result<()> {
        self.send(Command::SetFadeOffTime(ms)).await
    }

    pub async fn set_gentle_on_time(&self, ms: u32) -> Result<()> {
        self.send(Command::SetGentleOnTime(ms)).await
    }

    pub async fn set_gentle_off_time(&self, ms: u32) -> Result<()> {
        self.send(Command::SetGentleOffTime(ms)).await
    }

    pub async fn set_led_off(&self, off: bool) -> Result<()> {
        self.send(Command::SetLedOff(off)).await
    }

    /// Renames the device, or the configured outlet.
    pub async fn set_alias(&self, alias: impl Into<String>) -> Result<()> {
        self.send(Command::SetAlias(alias.into())).await
    }

    pub async fn reboot(&self, delay: u32) -> Result<()> {
        self.send(Command::Reboot { delay }).await
    }

    /// Unbinds the device from its cloud account.
    pub async fn disable_cloud(&self) -> Result<()> {
        self.send(Command::CloudUnbind).await
    }

    pub async fn enable_cloud(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::CloudBind {
            username: username.into(),
            password: password.into(),
        })
        .await
    }

    /// Points the device at another cloud host. Takes effect after a reboot.
    pub async fn set_cloud_server(&self, server: impl Into<String>) -> Result<()> {
        self.send(Command::SetCloudServer(server.into())).await
    }

    pub async fn clear_countdown_rules(&self) -> Result<()> {
        self.send(Command::DeleteAllCountdownRules).await
    }

    /// Switches to `turn_on` after `delay` seconds (1 to 3600).
    pub async fn add_countdown_rule(
        &self,
        delay: u32,
        turn_on: bool,
        name: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::AddCountdownRule {
            delay,
            turn_on,
            name: name.into(),
        })
        .await
    }

    /// Joins the device to another network. The device drops off the current
    /// one immediately.
    pub async fn set_wifi(
        &self,
        ssid: impl Into<String>,
        password: impl Into<String>,
        key_type: u8,
    ) -> Result<()> {
        self.send(Command::SetStaInfo {
            ssid: ssid.into(),
            password: password.into(),
            key_type,
        })
        .await
    }

    pub async fn set_emeter_gain(&self, vgain: u32, igain: u32) -> Result<()> {
        self.send(Command::SetEmeterGain { vgain, igain }).await
    }

    pub async fn start_emeter_calibration(&self, vtarget: u32, itarget: u32) -> Result<()> {
        self.send(Command::StartEmeterCalibration { vtarget, itarget }).await
    }

    pub async fn erase_emeter_stats(&self) -> Result<()> {
        self.send(Command::EraseEmeterStats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use kasa_proto::ProtoError;
    use kasa_proto::protocol::codec::encode_stream;
    use kasa_proto::protocol::crypto::unscramble;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, UdpSocket};
    use tokio::task::JoinHandle;

    use crate::error::KasaError;

    /// Answers one TCP request with `reply` and hands back the request text.
    async fn tcp_device(reply: &'static str) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut header = [0u8; 4];
            socket.read_exact(&mut header).await.unwrap();
            let mut body = vec![0u8; u32::from_be_bytes(header) as usize];
            socket.read_exact(&mut body).await.unwrap();
            socket
                .write_all(&encode_stream(reply.as_bytes()).unwrap())
                .await
                .unwrap();
            String::from_utf8(unscramble(&body)).unwrap()
        });
        (port, handle)
    }

    async fn udp_device() -> (u16, UdpSocket) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        (socket.local_addr().unwrap().port(), socket)
    }

    async fn recv_json(socket: &UdpSocket) -> Value {
        let mut buf = [0u8; 1024];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        serde_json::from_slice(&unscramble(&buf[..n])).unwrap()
    }

    fn local(port: u16) -> Device {
        Device::from_ip(
            Ipv4Addr::LOCALHOST,
            DeviceConfig {
                port,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_get_sysinfo() {
        let (port, device) = tcp_device(
            r#"{"system":{"get_sysinfo":{"alias":"Desk","relay_state":1,"model":"HS110(US)","err_code":0}}}"#,
        )
        .await;

        let info = local(port).get_sysinfo().await.unwrap();
        assert_eq!(info.alias, "Desk");
        assert!(info.is_on());

        assert_eq!(device.await.unwrap(), r#"{"system":{"get_sysinfo":{}}}"#);
    }

    #[tokio::test]
    async fn test_device_error_surfaces() {
        let (port, _device) =
            tcp_device(r#"{"emeter":{"err_code":-1,"err_msg":"module not support"}}"#).await;

        let err = local(port).get_emeter_realtime().await.unwrap_err();
        assert!(err.is_device_error());
    }

    #[tokio::test]
    async fn test_missing_module() {
        let (port, _device) = tcp_device(r#"{"system":{"get_sysinfo":{}}}"#).await;

        let err = local(port).get_countdown_rules().await.unwrap_err();
        assert!(matches!(err, KasaError::Proto(ProtoError::Missing("count_down"))));
    }

    #[tokio::test]
    async fn test_set_mode_waits_for_ack() {
        let (port, device) = tcp_device(r#"{"system":{"set_mode":{"err_code":0}}}"#).await;

        local(port).set_mode("count_down").await.unwrap();
        assert_eq!(
            device.await.unwrap(),
            r#"{"system":{"set_mode":{"mode":"count_down"}}}"#
        );
    }

    #[tokio::test]
    async fn test_relay_state_over_udp() {
        let (port, socket) = udp_device().await;
        local(port).set_relay_state(true).await.unwrap();

        let sent = recv_json(&socket).await;
        assert_eq!(sent["system"]["set_relay_state"]["state"], 1);
        assert!(sent.get("context").is_none());
    }

    #[tokio::test]
    async fn test_child_scope() {
        let (port, socket) = udp_device().await;
        local(port)
            .child("800612345600")
            .set_alias("Outlet 1")
            .await
            .unwrap();

        let sent = recv_json(&socket).await;
        assert_eq!(sent["context"]["child_ids"][0], "800612345600");
        assert_eq!(sent["system"]["set_dev_alias"]["alias"], "Outlet 1");
    }

    #[tokio::test]
    async fn test_children_relay_state() {
        let (port, socket) = udp_device().await;
        local(port)
            .set_children_relay_state(["AA00", "AA01"], false)
            .await
            .unwrap();

        let sent = recv_json(&socket).await;
        assert_eq!(sent["context"]["child_ids"].as_array().unwrap().len(), 2);
        assert_eq!(sent["system"]["set_relay_state"]["state"], 0);
    }

    #[tokio::test]
    async fn test_invalid_parameter_before_io() {
        // Port 9 (discard) is never contacted: validation fails first.
        let device = local(9);
        let err = device.set_brightness(101).await.unwrap_err();
        assert!(matches!(
            err,
            KasaError::Proto(ProtoError::InvalidParameter { name: "brightness", .. })
        ));

        let err = device.add_countdown_rule(0, true, "never").await.unwrap_err();
        assert!(matches!(
            err,
            KasaError::Proto(ProtoError::InvalidParameter { name: "delay", .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_literal() {
        let device = Device::resolve("127.0.0.1").await.unwrap();
        assert_eq!(device.ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(device.config().port, DEFAULT_PORT);
        assert_eq!(device.host(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_raw_datagram() {
        let (port, socket) = udp_device().await;
        let reply = local(port)
            .raw(r#"{"system":{"reboot":{"delay":1}}}"#, Mode::Datagram)
            .await
            .unwrap();
        assert!(reply.is_empty());

        let mut buf = [0u8; 256];
        let (n, from) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(unscramble(&buf[..n]), br#"{"system":{"reboot":{"delay":1}}}"#);
        assert!(matches!(from, SocketAddr::V4(_)));
    }
}
