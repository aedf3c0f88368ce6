mod device;
mod discovery;

pub use device::DeviceConfigBuilder;
pub use discovery::DiscoveryConfigBuilder;
