//! Git URL parsing.
//!
//! Supports the URL formats this crate's transports actually speak:
//! - git://host[:port]/path
//! - http[s]://[user@]host[:port]/path
//! - file:///path
//! - /local/path
//!
//! SSH and the SCP-like `user@host:path` shorthand are not supported; SSH
//! transport is out of scope for this implementation.

use crate::{GitUrl, Scheme, TransportError};

impl GitUrl {
    /// Parse a git URL string into a GitUrl.
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(TransportError::InvalidUrl("empty URL".into()));
        }

        // Check for scheme://... format
        if let Some(rest) = url.strip_prefix("git://") {
            return parse_standard(Scheme::Git, rest);
        }
        if let Some(rest) = url.strip_prefix("http://") {
            return parse_standard(Scheme::Http, rest);
        }
        if let Some(rest) = url.strip_prefix("https://") {
            return parse_standard(Scheme::Https, rest);
        }
        if let Some(rest) = url.strip_prefix("file://") {
            return Ok(GitUrl {
                scheme: Scheme::File,
                host: None,
                port: None,
                user: None,
                path: rest.to_string(),
            });
        }
        if url.strip_prefix("ssh://").is_some() || looks_like_scp(url) {
            return Err(TransportError::UnsupportedScheme("ssh".into()));
        }

        // Check for absolute local paths (Unix or Windows)
        if url.starts_with('/')
            || url.starts_with('.')
            || (url.len() >= 2 && url.as_bytes()[1] == b':')
        {
            return Ok(GitUrl {
                scheme: Scheme::Local,
                host: None,
                port: None,
                user: None,
                path: url.to_string(),
            });
        }

        Err(TransportError::InvalidUrl(format!(
            "could not parse URL: {}",
            url
        )))
    }
}

/// `user@host:path` or `host:path`, excluding Windows drive letters (`C:\path`).
fn looks_like_scp(url: &str) -> bool {
    match url.find(':') {
        Some(colon_pos) => {
            !(colon_pos == 1 && url.as_bytes()[0].is_ascii_alphabetic())
                && !url[..colon_pos].contains('/')
        }
        None => false,
    }
}

/// Parse a URL with scheme already stripped: [user@]host[:port]/path
fn parse_standard(scheme: Scheme, rest: &str) -> Result<GitUrl, TransportError> {
    // Split into host+port and path at the first /
    let (authority, path) = if let Some(slash_pos) = rest.find('/') {
        (&rest[..slash_pos], &rest[slash_pos..])
    } else {
        (rest, "/")
    };

    // Parse user@host:port from authority
    let (user, host_port) = if let Some(at_pos) = authority.find('@') {
        let user = &authority[..at_pos];
        let host_port = &authority[at_pos + 1..];
        (Some(user.to_string()), host_port)
    } else {
        (None, authority)
    };

    // Parse host:port
    // Handle IPv6: [host]:port
    let (host, port) = if host_port.starts_with('[') {
        // IPv6 address
        if let Some(bracket_end) = host_port.find(']') {
            let host = &host_port[1..bracket_end];
            let after_bracket = &host_port[bracket_end + 1..];
            let port = if let Some(port_str) = after_bracket.strip_prefix(':') {
                Some(port_str.parse::<u16>().map_err(|_| {
                    TransportError::InvalidUrl(format!("invalid port: {}", port_str))
                })?)
            } else {
                None
            };
            (host.to_string(), port)
        } else {
            return Err(TransportError::InvalidUrl(
                "unclosed IPv6 bracket".into(),
            ));
        }
    } else if let Some(colon_pos) = host_port.rfind(':') {
        let host = &host_port[..colon_pos];
        let port_str = &host_port[colon_pos + 1..];
        let port = port_str.parse::<u16>().map_err(|_| {
            TransportError::InvalidUrl(format!("invalid port: {}", port_str))
        })?;
        (host.to_string(), Some(port))
    } else {
        (host_port.to_string(), None)
    };

    if host.is_empty() {
        return Err(TransportError::InvalidUrl("empty host".into()));
    }

    Ok(GitUrl {
        scheme,
        host: Some(host),
        port,
        user,
        path: path.to_string(),
    })
}
