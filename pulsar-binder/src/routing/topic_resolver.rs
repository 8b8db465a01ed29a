/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Canonical topic-address resolution.

use std::fmt;

/// Persistence scheme used for every resolved address.
pub const DEFAULT_SCHEME: &str = "persistent";

/// Suffix of synthesized dead-letter topics.
pub const DEAD_QUEUE_SUFFIX: &str = "-dlq";

/// Suffix of synthesized retry topics.
pub const RETRY_QUEUE_SUFFIX: &str = "-retry";

/// Structured form of a resolved topic address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicAddress {
    pub tenant: String,
    pub namespace: String,
    pub name: String,
}

impl TopicAddress {
    pub fn new(
        tenant: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TopicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DEFAULT_SCHEME}://{}/{}/{}",
            self.tenant, self.namespace, self.name
        )
    }
}

/// A topic reference with optional per-call tenant/namespace overrides.
///
/// A bare `&str` converts into one with no overrides; missing parts fall back
/// to the resolver's global defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    pub topic: String,
    pub tenant: Option<String>,
    pub namespace: Option<String>,
}

impl TopicInfo {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            tenant: None,
            namespace: None,
        }
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl From<&str> for TopicInfo {
    fn from(topic: &str) -> Self {
        TopicInfo::new(topic)
    }
}

impl From<String> for TopicInfo {
    fn from(topic: String) -> Self {
        TopicInfo::new(topic)
    }
}

/// Pure resolver from declared topic strings to canonical addresses.
///
/// Resolution is idempotent: an already-qualified address is returned
/// verbatim, tenant/namespace arguments ignored.
#[derive(Debug, Clone)]
pub struct TopicResolver {
    scheme: String,
    default_tenant: String,
    default_namespace: String,
    lowercase_suffix: bool,
}

impl TopicResolver {
    pub fn new(
        default_tenant: impl Into<String>,
        default_namespace: impl Into<String>,
        lowercase_suffix: bool,
    ) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            default_tenant: default_tenant.into(),
            default_namespace: default_namespace.into(),
            lowercase_suffix,
        }
    }

    /// A topic is fully qualified when it carries the scheme marker followed
    /// by `//`, or is whitespace-free with three non-empty `/`-separated
    /// segments. Degenerate shapes with empty segments (`/a/b`, `a//b`,
    /// `a/b/`) are not qualified and get prefixed like any bare name.
    pub fn is_qualified(&self, topic: &str) -> bool {
        if topic.contains(&format!("{}//", self.scheme)) {
            return true;
        }
        if topic.chars().any(char::is_whitespace)
            || topic.starts_with('/')
            || topic.ends_with('/')
        {
            return false;
        }
        // Two separators with at least one character between them.
        match (topic.find('/'), topic.rfind('/')) {
            (Some(first), Some(last)) => last >= first + 2,
            _ => false,
        }
    }

    /// Resolves a topic string into a canonical address string.
    pub fn resolve(&self, tenant: Option<&str>, namespace: Option<&str>, topic: &str) -> String {
        if self.is_qualified(topic) {
            return topic.to_string();
        }
        format!("{}{topic}", self.prefix(tenant, namespace))
    }

    /// Structured variant of [`resolve`](Self::resolve) for non-qualified topics.
    pub fn address(&self, tenant: Option<&str>, namespace: Option<&str>, topic: &str) -> TopicAddress {
        TopicAddress::new(
            tenant.unwrap_or(&self.default_tenant),
            namespace.unwrap_or(&self.default_namespace),
            topic,
        )
    }

    /// `scheme://tenant/namespace/` with defaults filled in.
    pub fn prefix(&self, tenant: Option<&str>, namespace: Option<&str>) -> String {
        format!(
            "{}://{}/{}/",
            self.scheme,
            tenant.unwrap_or(&self.default_tenant),
            namespace.unwrap_or(&self.default_namespace),
        )
    }

    pub fn dead_letter_suffix(&self) -> String {
        self.cased(DEAD_QUEUE_SUFFIX)
    }

    pub fn retry_suffix(&self) -> String {
        self.cased(RETRY_QUEUE_SUFFIX)
    }

    fn cased(&self, suffix: &str) -> String {
        if self.lowercase_suffix {
            suffix.to_string()
        } else {
            suffix.to_uppercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TopicInfo, TopicResolver};

    fn resolver() -> TopicResolver {
        TopicResolver::new("public", "default", true)
    }

    #[test]
    fn bare_topic_expands_with_global_defaults() {
        assert_eq!(
            resolver().resolve(None, None, "orders"),
            "persistent://public/default/orders"
        );
    }

    #[test]
    fn explicit_tenant_and_namespace_take_precedence() {
        assert_eq!(
            resolver().resolve(Some("acme"), Some("billing"), "orders"),
            "persistent://acme/billing/orders"
        );
    }

    #[test]
    fn qualified_topics_resolve_to_themselves() {
        let resolver = resolver();
        for qualified in [
            "persistent://public/default/orders",
            "non-persistent://acme/billing/orders",
            "tenant/namespace/orders",
        ] {
            assert!(resolver.is_qualified(qualified), "{qualified}");
            assert_eq!(resolver.resolve(None, None, qualified), qualified);
            // Idempotence: re-resolving the resolved form is a no-op.
            let resolved = resolver.resolve(Some("other"), Some("other"), qualified);
            assert_eq!(resolver.resolve(None, None, &resolved), resolved);
        }
    }

    #[test]
    fn topics_with_whitespace_or_few_separators_are_not_qualified() {
        let resolver = resolver();
        assert!(!resolver.is_qualified("orders"));
        assert!(!resolver.is_qualified("tenant/orders"));
        assert!(!resolver.is_qualified("a b/c/d"));
    }

    #[test]
    fn empty_segments_disqualify_a_topic() {
        let resolver = resolver();
        for degenerate in ["/a/b", "a//b", "a/b/", "//", "a/b//"] {
            assert!(!resolver.is_qualified(degenerate), "{degenerate}");
        }
        // Such names are treated as bare and expanded with the defaults.
        assert_eq!(
            resolver.resolve(None, None, "a//b"),
            "persistent://public/default/a//b"
        );
    }

    #[test]
    fn prefix_defaults_and_overrides() {
        let resolver = resolver();
        assert_eq!(resolver.prefix(None, None), "persistent://public/default/");
        assert_eq!(
            resolver.prefix(Some("acme"), None),
            "persistent://acme/default/"
        );
    }

    #[test]
    fn suffix_case_follows_policy_flag() {
        assert_eq!(resolver().dead_letter_suffix(), "-dlq");
        assert_eq!(resolver().retry_suffix(), "-retry");

        let uppercase = TopicResolver::new("public", "default", false);
        assert_eq!(uppercase.dead_letter_suffix(), "-DLQ");
        assert_eq!(uppercase.retry_suffix(), "-RETRY");
    }

    #[test]
    fn topic_info_carries_overrides() {
        let info = TopicInfo::new("orders").tenant("acme").namespace("billing");
        assert_eq!(info.tenant.as_deref(), Some("acme"));
        assert_eq!(info.namespace.as_deref(), Some("billing"));

        let bare: TopicInfo = "orders".into();
        assert_eq!(bare, TopicInfo::new("orders"));
    }
}
