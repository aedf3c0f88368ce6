use std::error::Error;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_kasa::discovery::{self, Discovered};
use tokio_kasa::{Device, DeviceConfigBuilder, DiscoveryConfig, DiscoveryConfigBuilder, Mode};
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kasa")]
#[command(version, about = "Control Kasa smart plugs, strips and dimmers on the local network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Outlet id on a multi-outlet device
    #[arg(short, long, global = true)]
    child: Option<String>,

    /// Log protocol traffic
    #[arg(short, long, global = true)]
    debug: bool,

    /// Discovery probe rounds
    #[arg(short, long, global = true, default_value_t = 1)]
    repeats: u32,

    /// Timeout in seconds: the discovery budget, or the per-read deadline
    #[arg(short, long, global = true, default_value_t = 2)]
    timeout: u64,

    /// Alternate port when port-forwarding
    #[arg(short, long, global = true, default_value_t = tokio_kasa::constants::DEFAULT_PORT)]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover local devices
    Discover,
    /// Dimmer parameters of every local dimmer
    Dimmers,
    /// Wi-Fi status of every local device
    Wifi,
    /// Energy-meter readings of every local device with a meter
    Emeter,
    /// Show basic info
    Info { host: String },
    /// Relay and brightness state
    Status { host: String },
    /// Turn a relay on or off
    Switch {
        host: String,
        #[arg(action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Set brightness, 1 to 100
    Brightness { host: String, value: u8 },
    /// Turn the status LED off (true) or on (false)
    Ledoff {
        host: String,
        #[arg(action = clap::ArgAction::Set)]
        off: bool,
    },
    /// Rename the device, or the outlet given with --child
    Alias { host: String, name: String },
    /// Reboot the device
    Reboot { host: String },
    /// Unbind from the cloud account
    Nocloud { host: String },
    /// Bind to a cloud account
    Cloud {
        host: String,
        username: String,
        password: String,
    },
    /// Show, clear or add countdown rules
    Countdown {
        host: String,
        #[command(subcommand)]
        action: Option<CountdownAction>,
    },
    /// Show dimmer parameters
    Dimmer { host: String },
    /// Set a dimmer fade or gentle time in milliseconds
    Fade {
        host: String,
        #[arg(value_enum)]
        which: FadeKind,
        ms: u32,
    },
    /// Show schedule rules
    Rules { host: String },
    /// Set the operating mode
    Setmode { host: String, mode: String },
    /// Show Wi-Fi status
    Wifistatus { host: String },
    /// Join a WPA2 network
    Setwifi {
        host: String,
        ssid: String,
        key: String,
    },
    /// Send raw JSON and print the reply
    Raw { host: String, json: String },
}

#[derive(Subcommand)]
enum CountdownAction {
    /// Delete every countdown rule
    Delete,
    /// Switch the relay after a delay
    Add {
        /// Seconds, 1 to 3600
        delay: u32,
        #[arg(action = clap::ArgAction::Set)]
        state: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FadeKind {
    FadeOn,
    FadeOff,
    GentleOn,
    GentleOff,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    let filter_layer = filter::LevelFilter::from_level(level);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    let timeout = Duration::from_secs(cli.timeout);
    let scan: DiscoveryConfig = DiscoveryConfigBuilder::new()
        .timeout(timeout)
        .probes(cli.repeats)
        .port(cli.port)
        .into();

    match &cli.command {
        Commands::Discover => {
            let found = discovery::discover_sysinfo(&scan).await?;
            println!("found {} devices", found.len());
            for (ip, info) in sorted(&found) {
                if info.children.is_empty() {
                    println!(
                        "{ip:>15}: {} {:>32} [state: {}] [brightness: {:>3}]",
                        info.model, info.alias, info.relay_state, info.brightness
                    );
                } else {
                    println!("{ip:>15}: {} {}", info.model, info.alias);
                    for child in &info.children {
                        println!(
                            "    ID: {:>42} {:>26} [state: {}]",
                            info.child_id(child),
                            child.alias,
                            child.relay_state
                        );
                    }
                }
            }
        }
        Commands::Dimmers => {
            for (ip, params) in sorted(&discovery::discover_dimmers(&scan).await?) {
                println!("{ip}: {params:?}");
            }
        }
        Commands::Wifi => {
            for (ip, sta) in sorted(&discovery::discover_wifi(&scan).await?) {
                println!("{ip}: ssid {} rssi {} key_type {}", sta.ssid, sta.rssi, sta.key_type);
            }
        }
        Commands::Emeter => {
            for (ip, reading) in sorted(&discovery::discover_emeter(&scan).await?) {
                println!("{ip} slot {}", reading.slot_id);
                println!("Current:\t{}mA", reading.current_ma);
                println!("Voltage:\t{:.2}V", reading.voltage_mv as f64 / 1000.0);
                println!("Power:\t\t{:.2}W", reading.power_mw as f64 / 1000.0);
                println!("Total:\t\t{:.2}kWh", reading.total_wh as f64 / 1000.0);
            }
        }
        Commands::Info { host } => {
            let s = device(&cli, host, timeout).await?.get_sysinfo().await?;
            println!("Alias:\t\t{}", s.alias);
            println!("DevName:\t{}", s.dev_name);
            println!("Model:\t\t{} [{}]", s.model, s.hw_ver);
            println!("Device ID:\t{}", s.device_id);
            println!("OEM ID:\t\t{}", s.oem_id);
            println!("Hardware ID:\t{}", s.hw_id);
            println!("Software:\t{}", s.sw_ver);
            println!("MIC:\t\t{}", s.mic_type);
            println!("MAC:\t\t{}", s.mac);
            println!("LED Off:\t{}", s.led_off);
            println!("Active Mode:\t{}", s.active_mode);
            if s.is_multi_outlet() {
                for child in &s.children {
                    println!(
                        "Outlet [{}]:\t{}\t\t({})",
                        child.alias,
                        child.relay_state,
                        s.child_id(child)
                    );
                }
            } else {
                println!("Relay:\t{}\tBrightness:\t{}%", s.relay_state, s.brightness);
            }
        }
        Commands::Status { host } => {
            let s = device(&cli, host, timeout).await?.get_sysinfo().await?;
            if s.is_multi_outlet() {
                for child in &s.children {
                    println!("[{}].[{}]:\t{}", s.alias, child.alias, child.relay_state);
                }
            } else {
                println!("[{}]\tRelay:\t{}\tBrightness:\t{}%", s.alias, s.relay_state, s.brightness);
            }
        }
        Commands::Switch { host, state } => {
            device(&cli, host, timeout).await?.set_relay_state(*state).await?;
        }
        Commands::Brightness { host, value } => {
            let value = (*value).clamp(1, 100);
            device(&cli, host, timeout).await?.set_brightness(value).await?;
        }
        Commands::Ledoff { host, off } => {
            device(&cli, host, timeout).await?.set_led_off(*off).await?;
        }
        Commands::Alias { host, name } => {
            device(&cli, host, timeout).await?.set_alias(name.as_str()).await?;
        }
        Commands::Reboot { host } => {
            device(&cli, host, timeout).await?.reboot(1).await?;
        }
        Commands::Nocloud { host } => {
            device(&cli, host, timeout).await?.disable_cloud().await?;
        }
        Commands::Cloud {
            host,
            username,
            password,
        } => {
            device(&cli, host, timeout)
                .await?
                .enable_cloud(username.as_str(), password.as_str())
                .await?;
        }
        Commands::Countdown { host, action } => {
            let plug = device(&cli, host, timeout).await?;
            match action {
                None => {
                    for rule in plug.get_countdown_rules().await?.rule_list {
                        println!("{rule:?}");
                    }
                }
                Some(CountdownAction::Delete) => plug.clear_countdown_rules().await?,
                Some(CountdownAction::Add { delay, state }) => {
                    plug.add_countdown_rule(*delay, *state, "auto").await?
                }
            }
        }
        Commands::Dimmer { host } => {
            let params = device(&cli, host, timeout).await?.get_dimmer_parameters().await?;
            println!("{params:?}");
        }
        Commands::Fade { host, which, ms } => {
            let dimmer = device(&cli, host, timeout).await?;
            match which {
                FadeKind::FadeOn => dimmer.set_fade_on_time(*ms).await?,
                FadeKind::FadeOff => dimmer.set_fade_off_time(*ms).await?,
                FadeKind::GentleOn => dimmer.set_gentle_on_time(*ms).await?,
                FadeKind::GentleOff => dimmer.set_gentle_off_time(*ms).await?,
            }
        }
        Commands::Rules { host } => {
            let rules = device(&cli, host, timeout).await?.get_schedule_rules().await?;
            println!("{rules:?}");
        }
        Commands::Setmode { host, mode } => {
            device(&cli, host, timeout).await?.set_mode(mode.as_str()).await?;
        }
        Commands::Wifistatus { host } => {
            let sta = device(&cli, host, timeout).await?.get_wifi_status().await?;
            println!("{sta:?}");
        }
        Commands::Setwifi { host, ssid, key } => {
            device(&cli, host, timeout)
                .await?
                .set_wifi(ssid.as_str(), key.as_str(), 3)
                .await?;
        }
        Commands::Raw { host, json } => {
            let reply = device(&cli, host, timeout).await?.raw(json, Mode::Stream).await?;
            println!("{}", String::from_utf8_lossy(&reply));
        }
    }

    Ok(())
}

async fn device(cli: &Cli, host: &str, timeout: Duration) -> tokio_kasa::Result<Device> {
    let mut builder = DeviceConfigBuilder::new().port(cli.port).timeout(timeout);
    if let Some(child) = &cli.child {
        builder = builder.child_id(child.as_str());
    }
    Device::resolve_with_config(host, builder.build()).await
}

fn sorted<T>(found: &Discovered<T>) -> Vec<(&String, &T)> {
    let mut entries: Vec<_> = found.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
