//! Nmap XML output deserialization.
//!
//! Nmap's `-oX -` flag writes structured XML to stdout. The document is read
//! as an event stream and each `<host>` element is decoded on its own with
//! the serde structs below, schema-on-read: only the fields netscout uses are
//! declared, every attribute is an optional string, and numbers are
//! validated by hand. A single malformed host, port, or OS match is skipped
//! and counted rather than failing the document.

use std::net::Ipv4Addr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;

use netscout_core::types::UNKNOWN_SERVICE;
use netscout_core::DiscoveredHost;

use crate::error::{DiscoverError, Result};

/// Root element: `<nmaprun>`.
#[derive(Debug, Clone, Default)]
pub struct NmapRun {
    pub scanner: Option<String>,
    pub version: Option<String>,
    pub args: Option<String>,
    pub hosts: Vec<NmapHost>,
    /// `<host>` elements that could not be decoded.
    pub malformed: usize,
}

/// A single host from scan results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmapHost {
    pub status: Option<HostStatus>,
    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,
    pub hostnames: Option<Hostnames>,
    pub ports: Option<Ports>,
    pub os: Option<OsMatches>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr")]
    pub addr: Option<String>,
    #[serde(rename = "@addrtype")]
    pub addr_type: Option<String>,
    #[serde(rename = "@vendor")]
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hostnames {
    #[serde(rename = "hostname", default)]
    pub hostnames: Vec<Hostname>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hostname {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@type")]
    pub hostname_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ports {
    #[serde(rename = "port", default)]
    pub ports: Vec<NmapPort>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmapPort {
    #[serde(rename = "@protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "@portid")]
    pub port_id: Option<String>,
    pub state: Option<PortState>,
    pub service: Option<NmapService>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortState {
    #[serde(rename = "@state")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmapService {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@product")]
    pub product: Option<String>,
    #[serde(rename = "@version")]
    pub version: Option<String>,
    #[serde(rename = "@extrainfo")]
    pub extra_info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsMatches {
    #[serde(rename = "osmatch", default)]
    pub matches: Vec<OsMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsMatch {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@accuracy")]
    pub accuracy: Option<String>,
}

/// Hosts extracted from one nmap document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiscovery {
    /// Live hosts with a usable IPv4 address, in document order.
    pub hosts: Vec<DiscoveredHost>,
    /// `"<scanner> <version>"` from the root element, when present.
    pub scanner_version: Option<String>,
    /// Elements dropped because a value could not be used.
    pub skipped: usize,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn attr_is(value: &Option<String>, expected: &str) -> bool {
    non_empty(value).is_some_and(|v| v.eq_ignore_ascii_case(expected))
}

impl NmapRun {
    pub fn scanner_version(&self) -> Option<String> {
        let version = non_empty(&self.version)?;
        let scanner = non_empty(&self.scanner).unwrap_or("nmap");
        Some(format!("{scanner} {version}"))
    }
}

impl NmapHost {
    /// Check if the host is up (case-insensitive).
    pub fn is_up(&self) -> bool {
        self.status.as_ref().is_some_and(|s| attr_is(&s.state, "up"))
    }

    /// First address of the given type.
    fn address(&self, addr_type: &str) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| attr_is(&a.addr_type, addr_type) && non_empty(&a.addr).is_some())
    }

    /// Extract the first IPv4 address, if present.
    pub fn ipv4(&self) -> Option<&str> {
        self.address("ipv4").and_then(|a| non_empty(&a.addr))
    }

    /// Extract the first MAC address, if present.
    pub fn mac(&self) -> Option<&str> {
        self.address("mac").and_then(|a| non_empty(&a.addr))
    }

    /// Vendor attached to the MAC address, if non-empty.
    pub fn vendor(&self) -> Option<&str> {
        self.address("mac").and_then(|a| non_empty(&a.vendor))
    }

    /// First hostname typed PTR, "user", or untyped.
    pub fn hostname(&self) -> Option<&str> {
        self.hostnames
            .as_ref()?
            .hostnames
            .iter()
            .filter(|h| match non_empty(&h.hostname_type) {
                None => true,
                Some(t) => t.eq_ignore_ascii_case("PTR") || t.eq_ignore_ascii_case("user"),
            })
            .find_map(|h| non_empty(&h.name))
    }

    /// Best OS match, rendered `"name (Accuracy: X%)"`. Highest accuracy wins;
    /// the first match wins ties. A match without a usable accuracy ranks last.
    pub fn os_name(&self) -> Option<String> {
        let matches = &self.os.as_ref()?.matches;

        let mut best: Option<(&str, Option<u8>)> = None;
        for m in matches {
            let Some(name) = non_empty(&m.name) else {
                continue;
            };
            let accuracy = non_empty(&m.accuracy).and_then(|a| a.parse::<u8>().ok());
            let better = match best {
                None => true,
                Some((_, current)) => accuracy > current,
            };
            if better {
                best = Some((name, accuracy));
            }
        }

        best.map(|(name, accuracy)| match accuracy {
            Some(a) => format!("{name} (Accuracy: {a}%)"),
            None => name.to_string(),
        })
    }
}

/// Service description: `name (product version extrainfo)`, each part only
/// when present. Nothing usable yields `"Unknown service"`.
pub fn describe_service(service: Option<&NmapService>) -> String {
    let Some(service) = service else {
        return UNKNOWN_SERVICE.to_string();
    };

    let detail: Vec<&str> = [&service.product, &service.version, &service.extra_info]
        .into_iter()
        .filter_map(non_empty)
        .collect();

    match (non_empty(&service.name), detail.is_empty()) {
        (None, true) => UNKNOWN_SERVICE.to_string(),
        (Some(name), true) => name.to_string(),
        (name, false) => format!("{} ({})", name.unwrap_or("unknown"), detail.join(" ")),
    }
}

/// Parse nmap XML bytes into a structured `NmapRun`.
///
/// Only a document without a root element is an error. A host element that
/// fails to decode is counted in `malformed`; a stream error after the root
/// keeps the hosts read so far.
pub fn parse_nmap_xml(xml: &[u8]) -> Result<NmapRun> {
    let text = String::from_utf8_lossy(xml);
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Ok(NmapRun::default());
    }
    if !text.starts_with('<') {
        return Err(DiscoverError::XmlParse("document is not XML".to_string()));
    }

    let mut reader = Reader::from_str(text);
    let mut run: Option<NmapRun> = None;
    let mut depth = 0usize;

    loop {
        let start = offset(reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return stream_error(run, &e.to_string()),
        };

        match event {
            Event::Start(element) => {
                if run.is_none() {
                    run = Some(root_attributes(&element));
                    depth = 1;
                } else if depth == 1 && is_host(&element) {
                    if let Err(e) = reader.read_to_end(element.name()) {
                        return stream_error(run, &e.to_string());
                    }
                    let end = offset(reader.buffer_position());
                    if let Some(current) = run.as_mut() {
                        decode_host(text.get(start..end), current);
                    }
                } else {
                    depth += 1;
                }
            }
            Event::Empty(element) => {
                if run.is_none() {
                    run = Some(root_attributes(&element));
                } else if depth == 1 && is_host(&element) {
                    let end = offset(reader.buffer_position());
                    if let Some(current) = run.as_mut() {
                        decode_host(text.get(start..end), current);
                    }
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    run.ok_or_else(|| DiscoverError::XmlParse("document has no root element".to_string()))
}

fn is_host(element: &BytesStart<'_>) -> bool {
    element.local_name().as_ref() == b"host"
}

fn offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}

fn root_attributes(root: &BytesStart<'_>) -> NmapRun {
    let attr = |name: &str| {
        root.try_get_attribute(name)
            .ok()
            .flatten()
            .and_then(|a| a.unescape_value().ok())
            .map(|v| v.into_owned())
    };
    NmapRun {
        scanner: attr("scanner"),
        version: attr("version"),
        args: attr("args"),
        ..Default::default()
    }
}

fn decode_host(fragment: Option<&str>, run: &mut NmapRun) {
    let decoded = fragment
        .ok_or_else(|| "element outside the document".to_string())
        .and_then(|f| quick_xml::de::from_str::<NmapHost>(f).map_err(|e| e.to_string()));
    match decoded {
        Ok(host) => run.hosts.push(host),
        Err(reason) => {
            tracing::warn!(error = %reason, "Skipping malformed host element");
            run.malformed += 1;
        }
    }
}

/// A broken stream before the root is fatal; after it, the hosts already
/// decoded are kept and the unreadable remainder counts as one malformed host.
fn stream_error(run: Option<NmapRun>, reason: &str) -> Result<NmapRun> {
    match run {
        None => Err(DiscoverError::XmlParse(reason.to_string())),
        Some(mut run) => {
            tracing::warn!(error = %reason, hosts = run.hosts.len(), "Nmap output ends in unreadable XML");
            run.malformed += 1;
            Ok(run)
        }
    }
}

/// Decode an nmap document into live hosts. Blank input yields no hosts.
pub fn parse_discovery(xml: &[u8]) -> Result<ParsedDiscovery> {
    let run = parse_nmap_xml(xml)?;
    let mut parsed = ParsedDiscovery {
        scanner_version: run.scanner_version(),
        skipped: run.malformed,
        ..Default::default()
    };

    for host in &run.hosts {
        if !host.is_up() {
            continue;
        }
        if let Some(discovered) = convert_host(host, &mut parsed.skipped) {
            parsed.hosts.push(discovered);
        }
    }

    if parsed.skipped > 0 {
        tracing::warn!(
            skipped = parsed.skipped,
            hosts = parsed.hosts.len(),
            "Skipped unusable elements in nmap output"
        );
    }

    Ok(parsed)
}

/// Convert one live host. Problems are counted in `skipped`.
fn convert_host(host: &NmapHost, skipped: &mut usize) -> Option<DiscoveredHost> {
    let Some(raw_ip) = host.ipv4() else {
        tracing::debug!("Skipping live host without an IPv4 address");
        *skipped += 1;
        return None;
    };
    let Ok(ip) = raw_ip.parse::<Ipv4Addr>() else {
        tracing::warn!(addr = %raw_ip, "Skipping host with malformed IPv4 address");
        *skipped += 1;
        return None;
    };

    let mut discovered = DiscoveredHost::new(ip);
    discovered.mac = host.mac().map(str::to_uppercase);
    if discovered.mac.is_some() {
        discovered.manufacturer = host.vendor().map(str::to_string);
    }
    discovered.hostname = host.hostname().map(str::to_string);
    discovered.os = host.os_name();

    let ports = host.ports.as_ref().map(|p| p.ports.as_slice()).unwrap_or_default();
    for port in ports {
        let open = port.state.as_ref().is_some_and(|s| attr_is(&s.state, "open"));
        if !open {
            continue;
        }

        let raw_port = non_empty(&port.port_id).unwrap_or("");
        match raw_port.parse::<u16>() {
            Ok(port_id) if port_id > 0 => {
                discovered.add_open_port(port_id, describe_service(port.service.as_ref()));
            }
            _ => {
                tracing::warn!(ip = %ip, portid = %raw_port, "Skipping port with invalid id");
                *skipped += 1;
            }
        }
    }

    Some(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUICK_SCAN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<?xml-stylesheet href="file:///usr/bin/../share/nmap/nmap.xsl" type="text/xsl"?>
<nmaprun scanner="nmap" args="nmap -sT -sV -O -Pn -oX - 10.0.1.0/24" version="7.94" xmloutputversion="1.05">
  <scaninfo type="connect" protocol="tcp" numservices="1000" services="1-1000"/>
  <verbose level="0"/>
  <host>
    <status state="up" reason="arp-response"/>
    <address addr="10.0.1.1" addrtype="ipv4"/>
    <address addr="aa:bb:cc:dd:ee:01" addrtype="mac" vendor="TestVendor"/>
    <hostnames>
      <hostname name="gateway.local" type="PTR"/>
    </hostnames>
  </host>
  <taskprogress task="Service scan" percent="50.00"/>
  <host>
    <status state="up" reason="arp-response"/>
    <address addr="10.0.1.10" addrtype="ipv4"/>
    <address addr="AA:BB:CC:DD:EE:10" addrtype="mac" vendor=""/>
  </host>
  <host>
    <status state="down" reason="no-response"/>
    <address addr="10.0.1.99" addrtype="ipv4"/>
  </host>
  <runstats>
    <finished time="1740400000" elapsed="2.50"/>
    <hosts up="2" down="1" total="3"/>
  </runstats>
</nmaprun>"#;

    const STANDARD_SCAN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sT -sV -O -Pn 10.0.1.1" version="7.94">
  <host>
    <status state="UP" reason="syn-ack"/>
    <address addr="10.0.1.1" addrtype="ipv4"/>
    <hostnames>
      <hostname name="web-server.local" type="PTR"/>
    </hostnames>
    <ports>
      <extraports state="closed" count="996"/>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack"/>
        <service name="ssh" product="OpenSSH" version="9.6" extrainfo="Ubuntu Linux"><cpe>cpe:/a:openbsd:openssh:9.6</cpe></service>
      </port>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack"/>
        <service name="http" product="nginx" version="1.24.0"/>
      </port>
      <port protocol="tcp" portid="443">
        <state state="open" reason="syn-ack"/>
        <service name="https"/>
      </port>
      <port protocol="tcp" portid="8080">
        <state state="open" reason="syn-ack"/>
      </port>
      <port protocol="tcp" portid="3306">
        <state state="filtered" reason="no-response"/>
        <service name="mysql"/>
      </port>
    </ports>
    <os>
      <portused state="open" proto="tcp" portid="22"/>
      <osmatch name="Linux 5.15" accuracy="90"/>
      <osmatch name="Linux 6.1" accuracy="95"/>
      <osmatch name="Linux 6.2" accuracy="95"/>
    </os>
  </host>
</nmaprun>"#;

    #[test]
    fn test_parse_quick_scan() {
        let result = parse_discovery(QUICK_SCAN_XML.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.scanner_version.as_deref(), Some("nmap 7.94"));

        let gateway = &result.hosts[0];
        assert_eq!(gateway.ip, Ipv4Addr::new(10, 0, 1, 1));
        assert_eq!(gateway.mac.as_deref(), Some("AA:BB:CC:DD:EE:01"));
        assert_eq!(gateway.manufacturer.as_deref(), Some("TestVendor"));
        assert_eq!(gateway.hostname.as_deref(), Some("gateway.local"));
        assert!(gateway.open_ports.is_empty());

        let second = &result.hosts[1];
        assert_eq!(second.mac.as_deref(), Some("AA:BB:CC:DD:EE:10"));
        assert_eq!(second.manufacturer, None);
    }

    #[test]
    fn test_parse_standard_scan() {
        let result = parse_discovery(STANDARD_SCAN_XML.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 1);

        let host = &result.hosts[0];
        assert_eq!(host.hostname.as_deref(), Some("web-server.local"));
        assert_eq!(host.os.as_deref(), Some("Linux 6.1 (Accuracy: 95%)"));
        assert_eq!(
            host.open_ports.iter().copied().collect::<Vec<_>>(),
            vec![22, 80, 443, 8080]
        );
        assert_eq!(host.services[&22], "ssh (OpenSSH 9.6 Ubuntu Linux)");
        assert_eq!(host.services[&80], "http (nginx 1.24.0)");
        assert_eq!(host.services[&443], "https");
        assert_eq!(host.services[&8080], UNKNOWN_SERVICE);
        assert!(!host.services.contains_key(&3306));
    }

    #[test]
    fn test_parse_empty_scan() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sn 192.168.99.0/24">
  <runstats>
    <finished elapsed="1.00"/>
    <hosts up="0" down="256" total="256"/>
  </runstats>
</nmaprun>"#;

        let result = parse_discovery(xml.as_bytes()).unwrap();
        assert!(result.hosts.is_empty());
        assert_eq!(result.scanner_version, None);
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert_eq!(parse_discovery(b"").unwrap(), ParsedDiscovery::default());
        assert_eq!(parse_discovery(b"  \n").unwrap(), ParsedDiscovery::default());
    }

    #[test]
    fn test_non_xml_is_rejected() {
        let err = parse_discovery(b"Failed to resolve \"nowhere\".").unwrap_err();
        assert!(matches!(err, DiscoverError::XmlParse(_)));
    }

    #[test]
    fn test_down_hosts_never_appear() {
        let xml = r#"<nmaprun>
  <host><status state="down"/><address addr="10.0.0.1" addrtype="ipv4"/></host>
  <host><address addr="10.0.0.2" addrtype="ipv4"/></host>
  <host><status state="unknown"/><address addr="10.0.0.3" addrtype="ipv4"/></host>
</nmaprun>"#;
        let result = parse_discovery(xml.as_bytes()).unwrap();
        assert!(result.hosts.is_empty());
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_host_without_ipv4_is_excluded() {
        let xml = r#"<nmaprun>
  <host>
    <status state="up"/>
    <address addr="fe80::1" addrtype="ipv6"/>
    <address addr="AA:BB:CC:00:11:22" addrtype="mac" vendor="Acme"/>
  </host>
  <host>
    <status state="up"/>
    <address addr="10.0.0.7" addrtype="ipv4"/>
  </host>
</nmaprun>"#;
        let result = parse_discovery(xml.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 1);
        assert_eq!(result.hosts[0].ip, Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_bad_values_are_skipped_not_fatal() {
        let xml = r#"<nmaprun>
  <host>
    <status state="up"/>
    <address addr="10.0.0.300" addrtype="ipv4"/>
  </host>
  <host>
    <status state="up"/>
    <address addr="10.0.0.8" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="eighty"><state state="open"/></port>
      <port protocol="tcp" portid="70000"><state state="open"/></port>
      <port protocol="tcp" portid="22"><state state="open"/><service name="ssh"/></port>
    </ports>
    <os><osmatch name="Mystery OS" accuracy="high"/></os>
  </host>
</nmaprun>"#;
        let result = parse_discovery(xml.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 1);
        assert_eq!(result.skipped, 3);

        let host = &result.hosts[0];
        assert_eq!(host.open_ports.iter().copied().collect::<Vec<_>>(), vec![22]);
        assert_eq!(host.os.as_deref(), Some("Mystery OS"));
    }

    #[test]
    fn test_malformed_host_does_not_lose_neighbours() {
        let xml = r#"<nmaprun scanner="nmap" version="7.94">
  <host>
    <status state="up"/>
    <address addr="10.0.0.1" addrtype="ipv4"/>
  </host>
  <host>
    <status state="up"/>
    <status state="down"/>
    <address addr="10.0.0.2" addrtype="ipv4"/>
  </host>
  <host>
    <status state="up"/>
    <address addr="10.0.0.3" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open"/>
        <service name="ssh"/>
        <service name="ssh-alt"/>
      </port>
    </ports>
  </host>
  <host>
    <status state="up"/>
    <address addr="10.0.0.4" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="80"><state state="open"/><service name="http"/></port>
    </ports>
  </host>
</nmaprun>"#;
        let result = parse_discovery(xml.as_bytes()).unwrap();
        let ips: Vec<Ipv4Addr> = result.hosts.iter().map(|h| h.ip).collect();
        assert_eq!(ips, vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 4)]);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.scanner_version.as_deref(), Some("nmap 7.94"));
        assert_eq!(result.hosts[1].services[&80], "http");
    }

    #[test]
    fn test_truncated_document_keeps_complete_hosts() {
        let xml = r#"<nmaprun scanner="nmap" version="7.94">
  <host><status state="up"/><address addr="10.0.0.1" addrtype="ipv4"/></host>
  <host><status state="up"/><address addr="10.0.0.2" addrtype="ipv4"/>"#;
        let result = parse_discovery(xml.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 1);
        assert_eq!(result.hosts[0].ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_root_attributes_are_unescaped() {
        let xml = r#"<nmaprun scanner="nmap" version="7.94&#x2B;dev"/>"#;
        let run = parse_nmap_xml(xml.as_bytes()).unwrap();
        assert_eq!(run.scanner_version().as_deref(), Some("nmap 7.94+dev"));
        assert!(run.hosts.is_empty());
    }

    #[test]
    fn test_hostname_prefers_ptr_user_or_untyped() {
        let host = NmapHost {
            hostnames: Some(Hostnames {
                hostnames: vec![
                    Hostname {
                        name: Some("ignored.example".to_string()),
                        hostname_type: Some("other".to_string()),
                    },
                    Hostname {
                        name: Some("chosen.example".to_string()),
                        hostname_type: Some("user".to_string()),
                    },
                ],
            }),
            ..Default::default()
        };
        assert_eq!(host.hostname(), Some("chosen.example"));
        assert_eq!(host.ipv4(), None);
        assert!(!host.is_up());
    }

    #[test]
    fn test_service_description_parts() {
        assert_eq!(describe_service(None), UNKNOWN_SERVICE);
        assert_eq!(describe_service(Some(&NmapService::default())), UNKNOWN_SERVICE);

        let svc = NmapService {
            name: Some("http".to_string()),
            version: Some("2.4".to_string()),
            ..Default::default()
        };
        assert_eq!(describe_service(Some(&svc)), "http (2.4)");

        let nameless = NmapService {
            product: Some("Jetty".to_string()),
            ..Default::default()
        };
        assert_eq!(describe_service(Some(&nameless)), "unknown (Jetty)");
    }
}
