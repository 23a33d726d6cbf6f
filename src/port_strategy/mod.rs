//! Resolves the loosely typed protocol and port-mode inputs of a scan request.
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Number of ports used for a top-N request whose count cannot be read.
pub const DEFAULT_TOP_PORTS: u32 = 100;

/// Port set scanned when the request names neither a top-N count nor a
/// custom list.
pub const DEFAULT_PORT_SET: &str = "21,22,23,80,443";

/// Transport protocol of a scan.
///
/// The declaration order matters: findings on the same port are ordered
/// tcp before udp.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Anything that is not `udp` (ignoring case) is TCP, including no input at all.
    pub fn resolve(input: Option<&str>) -> Self {
        match input {
            Some(value) if value.trim().eq_ignore_ascii_case("udp") => Self::Udp,
            _ => Self::Tcp,
        }
    }

    /// Key under which the engine reports findings for this protocol.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which ports a scan covers.
///   - Default scans the configured fixed port set.
///   - TopN scans the N most common ports known to the engine.
///   - Custom passes the caller's port expression through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortMode {
    Default,
    TopN(NonZeroU32),
    Custom(String),
}

impl PortMode {
    /// Picks the port mode for a request. Never fails.
    ///
    /// A mode mentioning `top` wins over everything else; its digits give the
    /// count and `default_top` fills in when they are missing or zero. A
    /// `custom` mode only counts when `ports` still has content after all
    /// whitespace is removed.
    ///
    /// ```rust
    /// # use std::num::NonZeroU32;
    /// # use scanshape::port_strategy::PortMode;
    /// let top = NonZeroU32::new(100).unwrap();
    /// assert_eq!(
    ///     PortMode::pick(Some("custom"), Some("22, 80,443"), top),
    ///     PortMode::Custom("22,80,443".to_owned())
    /// );
    /// assert_eq!(PortMode::pick(Some("topXY"), None, top), PortMode::TopN(top));
    /// ```
    pub fn pick(mode: Option<&str>, ports: Option<&str>, default_top: NonZeroU32) -> Self {
        let Some(mode) = mode else {
            return Self::Default;
        };

        if mode.to_ascii_lowercase().contains("top") {
            return Self::TopN(top_count(mode).unwrap_or(default_top));
        }

        if mode.trim().eq_ignore_ascii_case("custom") {
            let stripped: String = ports
                .unwrap_or_default()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if !stripped.is_empty() {
                return Self::Custom(stripped);
            }
        }

        Self::Default
    }
}

/// Collects every ASCII digit of `mode` into a count. `None` when there are
/// no digits, the count is zero, or it does not fit.
fn top_count(mode: &str) -> Option<NonZeroU32> {
    let digits: String = mode.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok().and_then(NonZeroU32::new)
}

#[cfg(test)]
mod tests {
    use super::{PortMode, Protocol};
    use parameterized::parameterized;
    use std::num::NonZeroU32;

    fn top(n: u32) -> PortMode {
        PortMode::TopN(NonZeroU32::new(n).unwrap())
    }

    fn default_top() -> NonZeroU32 {
        NonZeroU32::new(100).unwrap()
    }

    #[parameterized(input = {
        Some("udp"), Some("UDP"), Some(" Udp "), Some("tcp"), Some("TCP"), Some("sctp"), Some(""), None
    }, expected = {
        Protocol::Udp, Protocol::Udp, Protocol::Udp, Protocol::Tcp, Protocol::Tcp, Protocol::Tcp, Protocol::Tcp, Protocol::Tcp
    })]
    fn protocol_resolution(input: Option<&str>, expected: Protocol) {
        assert_eq!(Protocol::resolve(input), expected);
    }

    #[test]
    fn tcp_sorts_before_udp() {
        assert!(Protocol::Tcp < Protocol::Udp);
    }

    #[parameterized(mode = {
        "top50", "top1000", "TOP10", "topXY", "top", "top0", "top99999999999", "t0p5top2"
    }, expected = {
        top(50), top(1000), top(10), top(100), top(100), top(100), top(100), top(52)
    })]
    fn top_mode_always_resolves_to_a_positive_count(mode: &str, expected: PortMode) {
        assert_eq!(PortMode::pick(Some(mode), None, default_top()), expected);
    }

    #[test]
    fn top_mode_wins_over_custom_ports() {
        let mode = PortMode::pick(Some("top20"), Some("22,80"), default_top());
        assert_eq!(mode, top(20));
    }

    #[test]
    fn custom_ports_are_stripped_of_whitespace_in_order() {
        let mode = PortMode::pick(Some("custom"), Some(" 443, 22 ,\t80-90 "), default_top());
        assert_eq!(mode, PortMode::Custom("443,22,80-90".to_owned()));
    }

    #[test]
    fn custom_ports_are_not_validated() {
        let mode = PortMode::pick(Some("Custom"), Some("abc,70000"), default_top());
        assert_eq!(mode, PortMode::Custom("abc,70000".to_owned()));
    }

    #[parameterized(mode = {
        Some("custom"), Some("custom"), Some("custom"), Some("everything"), None
    }, ports = {
        Some(""), Some("  \n "), None, Some("22"), Some("22")
    })]
    fn falls_back_to_default_port_set(mode: Option<&str>, ports: Option<&str>) {
        assert_eq!(PortMode::pick(mode, ports, default_top()), PortMode::Default);
    }

    #[test]
    fn configured_default_top_is_used() {
        let configured = NonZeroU32::new(250).unwrap();
        assert_eq!(PortMode::pick(Some("top"), None, configured), top(250));
    }
}
