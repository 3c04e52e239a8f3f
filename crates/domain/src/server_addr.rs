use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// Address of the name server to query. Accepts a bare IP (`8.8.4.4`),
/// an IP with port (`8.8.4.4:5353`), or a bracketed IPv6 form
/// (`[2001:4860:4860::8888]:53`). The port defaults to 53.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerAddr {
    addr: SocketAddr,
}

impl ServerAddr {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

impl FromStr for ServerAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(ServerAddr::new(addr));
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(ServerAddr::new(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }
        if let Some((host, port)) = parse_host_port(s) {
            if let Ok(ip) = host.parse::<IpAddr>() {
                return Ok(ServerAddr::new(SocketAddr::new(ip, port)));
            }
        }
        Err(format!(
            "Invalid server address '{}'. Expected IP, IP:PORT or [IPv6]:PORT",
            s
        ))
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}
