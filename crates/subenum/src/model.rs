use crate::{Error, Result};
use lazy_regex::regex_is_match;
use std::fmt;

// region:        --- Models

/// Validated enumeration target, lower-cased and stripped of any scheme,
/// port or path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> Result<Self> {
        let mut host = input.trim().to_ascii_lowercase();
        for scheme in ["http://", "https://"] {
            if let Some(stripped) = host.strip_prefix(scheme) {
                host = stripped.to_string();
                break;
            }
        }
        if let Some(end) = host.find(['/', '?', '#', ':']) {
            host.truncate(end);
        }

        if !regex_is_match!(r"^[a-z0-9]+([\-\.][a-z0-9]+)*\.[a-z]{2,}$", &host) {
            return Err(Error::InvalidDomain(input.to_string()));
        }

        Ok(Self(host))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `host` is a strict subdomain: it ends with `.` + domain.
    pub fn owns(&self, host: &str) -> bool {
        host.len() > self.0.len() + 1
            && host.ends_with(&self.0)
            && host[..host.len() - self.0.len()].ends_with('.')
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPortRecord {
    pub host: String,
    pub ports: Vec<u16>,
}

// endregion:     --- Models

// region:        --- Tests


// endregion:     --- Tests
