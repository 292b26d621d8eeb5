use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

/// The two network construction task variants a submission can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Generic network constructor
    Standard,
    /// Variant producing output for the provider integration
    Provider,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Standard, JobKind::Provider];

    /// URL segment selecting this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Standard => "standard",
            JobKind::Provider => "provider",
        }
    }

    /// Task name the executor dispatches on
    pub fn task_name(&self) -> &'static str {
        match self {
            JobKind::Standard => "netgate.construct_network",
            JobKind::Provider => "netgate.construct_network_for_provider",
        }
    }
}

impl FromStr for JobKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GatewayError::resource("url", "no such network construction method"))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!("standard".parse::<JobKind>().unwrap(), JobKind::Standard);
        assert_eq!("provider".parse::<JobKind>().unwrap(), JobKind::Provider);
    }

    #[test]
    fn test_unknown_kind_is_resource_error() {
        for raw in ["", "Standard", "louvain", "standard/"] {
            let err = raw.parse::<JobKind>().unwrap_err();
            assert_eq!(err.name(), "ResourceError");
            assert_eq!(err.target(), "url");
            assert_eq!(err.to_string(), "no such network construction method");
        }
    }

    #[test]
    fn test_task_names_distinct() {
        assert_ne!(JobKind::Standard.task_name(), JobKind::Provider.task_name());
    }
}
