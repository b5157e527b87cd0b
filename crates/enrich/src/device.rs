//! Device-type detection from user-agent strings.

use tracker_core::DeviceType;
use woothee::parser::Parser;

/// Wraps the woothee parser; the hit log only distinguishes mobile from
/// desktop, so every other category collapses to desktop.
pub struct DeviceParser {
    parser: Parser,
}

impl DeviceParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn device_type(&self, user_agent: &str) -> DeviceType {
        if user_agent.is_empty() {
            return DeviceType::Desktop;
        }
        match self.parser.parse(user_agent) {
            Some(result) if matches!(result.category, "smartphone" | "mobilephone") => {
                DeviceType::Mobile
            }
            _ => DeviceType::Desktop,
        }
    }
}

impl Default for DeviceParser {
    fn default() -> Self {
        Self::new()
    }
}
