//! Host classification.
//!
//! Benchmark nodes in a shared cluster do not all run at the same speed. The
//! configured host table says which ones are known to be fast or slow so the
//! grading report can be read with that in mind.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostClass {
    Fast,
    Normal,
    Slow,
    Unknown,
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostClass::Fast => "fast",
            HostClass::Normal => "normal",
            HostClass::Slow => "slow",
            HostClass::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub name: String,
    pub class: HostClass,
}

impl HostInfo {
    pub fn classify(name: &str, table: &BTreeMap<String, HostClass>) -> Self {
        let class = table.get(name).copied().unwrap_or(HostClass::Unknown);
        Self {
            name: name.to_string(),
            class,
        }
    }

    /// Classify the current machine.
    pub fn detect(table: &BTreeMap<String, HostClass>) -> Self {
        let host = Self::classify(&hostname(), table);
        debug!("{}", host);
        host
    }

    /// Report line saying what is known about this host.
    pub fn status_line(&self) -> String {
        match self.class {
            HostClass::Unknown => format!("WARNING.  Running on unknown host {}", self.name),
            HostClass::Normal => format!("INFO.  Running on normal host {}", self.name),
            class => format!(
                "WARNING.  Running on host {}, which is known to be {}",
                self.name, class
            ),
        }
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Host {}({})", self.name, self.class)
    }
}

pub fn hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "unknown".to_string())
}
