//! Reader for the engine's XML result artifacts (`nmap -oX`).
//!
//! Only what the report needs is extracted: host address and status, and for
//! each listed port its number, protocol, state and service name. States are
//! kept as raw strings; checking them against the known set is the
//! aggregator's job.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("not an nmap report, root element is <{0}>")]
    NotNmap(String),

    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid port number '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortFact {
    pub port: u16,
    pub protocol: String,
    pub state: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    pub address: String,
    pub up: bool,
    /// Ports in the order the engine listed them.
    pub ports: Vec<PortFact>,
}

pub fn parse_file(path: &Path) -> Result<Vec<HostFacts>, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text)
}

pub fn parse_str(xml: &str) -> Result<Vec<HostFacts>, ArtifactError> {
    // nmap output always carries a DOCTYPE.
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(xml, options)?;

    let root = doc.root_element();
    if !root.has_tag_name("nmaprun") {
        return Err(ArtifactError::NotNmap(root.tag_name().name().to_string()));
    }

    children(root, "host").map(parse_host).collect()
}

fn parse_host(host: Node) -> Result<HostFacts, ArtifactError> {
    let up = children(host, "status")
        .next()
        .and_then(|status| status.attribute("state"))
        == Some("up");

    let address = host_address(host)?;

    let mut ports = Vec::new();
    for list in children(host, "ports") {
        for port in children(list, "port") {
            ports.push(parse_port(port)?);
        }
    }

    Ok(HostFacts { address, up, ports })
}

/// Picks the IP address of a host, ignoring MAC addresses.
fn host_address(host: Node) -> Result<String, ArtifactError> {
    let mut fallback = None;
    for address in children(host, "address") {
        let addr = address.attribute("addr");
        match address.attribute("addrtype") {
            Some("ipv4") | Some("ipv6") | None => {
                if let Some(addr) = addr {
                    return Ok(addr.to_string());
                }
            }
            _ => fallback = fallback.or(addr),
        }
    }

    fallback
        .map(str::to_string)
        .ok_or(ArtifactError::MissingAttribute {
            element: "address",
            attribute: "addr",
        })
}

fn parse_port(port: Node) -> Result<PortFact, ArtifactError> {
    let portid = port.attribute("portid").ok_or(ArtifactError::MissingAttribute {
        element: "port",
        attribute: "portid",
    })?;
    let number = portid
        .parse::<u16>()
        .map_err(|_| ArtifactError::InvalidPort(portid.to_string()))?;

    let state = children(port, "state")
        .next()
        .and_then(|state| state.attribute("state"))
        .ok_or(ArtifactError::MissingAttribute {
            element: "state",
            attribute: "state",
        })?;

    let service = children(port, "service")
        .next()
        .and_then(|service| service.attribute("name"))
        .unwrap_or_default();

    Ok(PortFact {
        port: number,
        protocol: port.attribute("protocol").unwrap_or("tcp").to_string(),
        state: state.to_string(),
        service: service.to_string(),
    })
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(name))
}
