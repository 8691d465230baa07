//! Development server settings for the web target.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

pub const DEFAULT_DEV_PORT: u16 = 9000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowedHosts {
    /// Accept any `Host` header.
    All,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub compress: bool,
    pub allowed_hosts: AllowedHosts,
    /// Served in order; first hit wins. Relative to the project root.
    pub static_dirs: Vec<PathBuf>,
    /// Serve `index.html` for directory requests.
    pub index: bool,
    /// Extension (without dot) to content type.
    pub mime_overrides: IndexMap<String, String>,
    pub server_side_render: bool,
    pub write_to_disk: bool,
    /// Always off; every change is a full reload. Checked by
    /// [`TargetDescriptor::validate`](crate::TargetDescriptor::validate).
    pub hot: bool,
}

impl DevServerSettings {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn mime_override(&self, extension: &str) -> Option<&str> {
        self.mime_overrides.get(extension).map(String::as_str)
    }
}

impl Default for DevServerSettings {
    fn default() -> Self {
        let mut mime_overrides = IndexMap::new();
        mime_overrides.insert("phtml".to_string(), "text/html".to_string());

        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_DEV_PORT,
            compress: true,
            allowed_hosts: AllowedHosts::All,
            static_dirs: vec![
                PathBuf::from("assets"),
                PathBuf::from("test"),
                PathBuf::from("lib"),
            ],
            index: true,
            mime_overrides,
            server_side_render: true,
            write_to_disk: true,
            hot: false,
        }
    }
}
