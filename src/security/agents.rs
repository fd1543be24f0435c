//! Suspicious user-agent detection.
//!
//! # Design Decisions
//! - Substring match on the case-folded user-agent, no regex in the hot path
//! - Patterns are normalized once at construction
//! - A missing or empty user-agent is never suspicious

/// Scanner and exploitation tools flagged by default.
pub const DEFAULT_SUSPICIOUS_AGENTS: &[&str] = &[
    "sqlmap",
    "nikto",
    "nmap",
    "masscan",
    "acunetix",
    "nessus",
    "dirbuster",
    "gobuster",
    "wpscan",
    "zgrab",
    "nuclei",
];

/// Case-insensitive set of user-agent substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousAgents {
    patterns: Vec<String>,
}

impl SuspiciousAgents {
    /// Builds the list, lower-casing patterns and dropping blanks and duplicates.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim().to_lowercase();
            if !pattern.is_empty() && !normalized.contains(&pattern) {
                normalized.push(pattern);
            }
        }
        Self { patterns: normalized }
    }

    /// Returns the first pattern found in `user_agent`, if any.
    pub fn matched(&self, user_agent: &str) -> Option<&str> {
        if user_agent.is_empty() {
            return None;
        }
        let folded = user_agent.to_lowercase();
        self.patterns
            .iter()
            .find(|pattern| folded.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn is_suspicious(&self, user_agent: &str) -> bool {
        self.matched(user_agent).is_some()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SuspiciousAgents {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPICIOUS_AGENTS)
    }
}
