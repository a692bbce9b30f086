//! Locale fallback policy
//!
//! A policy maps each known locale tag to its ordered fallback chain, most
//! specific first and always ending in the neutral tag `""`:
//!
//! ```text
//! ""      -> [""]
//! "en"    -> ["en", ""]
//! "en-us" -> ["en-us", "en", ""]
//! ```
//!
//! Chains are configuration data and are returned verbatim. Locales without an
//! entry fall back to the neutral chain. Tags are compared case-insensitively.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{LgError, Result};

/// The neutral (default, language-agnostic) locale tag
pub const NEUTRAL: &str = "";

/// Locales registered by [`LocalePolicy::default`]
const BUILTIN_TAGS: &[&str] = &[
    "ar-sa", "cs-cz", "da-dk", "de-at", "de-ch", "de-de", "el-gr", "en-au", "en-ca", "en-gb", "en-ie", "en-in",
    "en-nz", "en-us", "en-za", "es-ar", "es-es", "es-mx", "es-us", "fi-fi", "fr-be", "fr-ca", "fr-ch", "fr-fr",
    "he-il", "hi-in", "hu-hu", "id-id", "it-ch", "it-it", "ja-jp", "ko-kr", "nb-no", "nl-be", "nl-nl", "pl-pl",
    "pt-br", "pt-pt", "ro-ro", "ru-ru", "sv-se", "th-th", "tr-tr", "uk-ua", "vi-vn", "zh-cn", "zh-hans", "zh-hant",
    "zh-hk", "zh-tw",
];

/// Normalize a locale tag for comparison: trimmed, lowercase, `_` mapped to `-`
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// Immutable mapping from locale tag to fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalePolicy {
    chains: IndexMap<String, Vec<String>>,
}

impl LocalePolicy {
    /// Build a policy from explicit `(locale, chain)` entries
    ///
    /// Tags are normalized, duplicate tags within a chain are dropped (first
    /// occurrence wins) and every chain is terminated with the neutral tag.
    /// Fails with [`LgError::MalformedPolicy`] when there is no neutral entry
    /// or a chain lists tags after the neutral tag.
    pub fn new<I, K, C, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chains = IndexMap::new();
        for (locale, chain) in entries {
            let locale = normalize_tag(locale.as_ref());
            let chain = normalize_chain(&locale, chain)?;
            debug!(%locale, ?chain, "LocalePolicy::new: registering chain");
            chains.insert(locale, chain);
        }

        if !chains.contains_key(NEUTRAL) {
            return Err(LgError::MalformedPolicy("policy has no entry for the neutral locale \"\"".to_string()));
        }

        Ok(Self { chains })
    }

    /// Build a policy by truncating each tag at its hyphens
    ///
    /// `zh-hant-tw` registers `zh-hant-tw`, `zh-hant` and `zh`, each with a chain
    /// made of its own truncations followed by `""`. The neutral entry is always
    /// registered first.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chains = IndexMap::new();
        chains.insert(NEUTRAL.to_string(), vec![NEUTRAL.to_string()]);

        for tag in tags {
            let tag = normalize_tag(tag.as_ref());
            let mut current = tag.as_str();
            while !current.is_empty() {
                if !chains.contains_key(current) {
                    chains.insert(current.to_string(), truncation_chain(current));
                }
                current = match current.rfind('-') {
                    Some(idx) => &current[..idx],
                    None => NEUTRAL,
                };
            }
        }

        Self { chains }
    }

    /// Fallback chain for `locale`, or the neutral chain when it is not registered
    pub fn chain_for(&self, locale: &str) -> Result<&[String]> {
        let key = normalize_tag(locale);
        if let Some(chain) = self.chains.get(&key) {
            debug!(%locale, ?chain, "LocalePolicy::chain_for: registered chain");
            return Ok(chain);
        }
        match self.chains.get(NEUTRAL) {
            Some(chain) => {
                debug!(%locale, "LocalePolicy::chain_for: using neutral chain");
                Ok(chain)
            }
            None => Err(LgError::UnsupportedLocale {
                locale: locale.to_string(),
            }),
        }
    }

    /// Whether `locale` has its own entry
    pub fn contains(&self, locale: &str) -> bool {
        self.chains.contains_key(&normalize_tag(locale))
    }

    /// Registered locale tags in definition order
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// Registered `(locale, chain)` pairs in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.chains.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Closest locale shared by the fallback chains of `a` and `b`
    ///
    /// Scans `a`'s chain in the outer loop and `b`'s chain in the inner loop and
    /// returns the first common tag. Returns `""` when either locale is not
    /// registered or nothing is shared.
    pub fn ancestor(&self, a: &str, b: &str) -> String {
        let (Some(chain_a), Some(chain_b)) = (
            self.chains.get(&normalize_tag(a)),
            self.chains.get(&normalize_tag(b)),
        ) else {
            debug!(%a, %b, "LocalePolicy::ancestor: locale not in policy");
            return NEUTRAL.to_string();
        };

        for tag_a in chain_a {
            for tag_b in chain_b {
                if tag_a == tag_b {
                    return tag_a.clone();
                }
            }
        }
        NEUTRAL.to_string()
    }
}

impl Default for LocalePolicy {
    fn default() -> Self {
        Self::from_tags(BUILTIN_TAGS)
    }
}

impl<'de> Deserialize<'de> for LocalePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = IndexMap::<String, Vec<String>>::deserialize(deserializer)?;
        LocalePolicy::new(raw).map_err(serde::de::Error::custom)
    }
}

fn normalize_chain<C, S>(locale: &str, chain: C) -> Result<Vec<String>>
where
    C: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    let mut neutral_seen = false;
    for tag in chain {
        let tag = normalize_tag(tag.as_ref());
        if tag.is_empty() {
            neutral_seen = true;
        } else if neutral_seen {
            return Err(LgError::MalformedPolicy(format!(
                "chain for '{}' lists '{}' after the neutral locale",
                locale, tag
            )));
        } else if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out.push(NEUTRAL.to_string());
    Ok(out)
}

fn truncation_chain(tag: &str) -> Vec<String> {
    let mut chain = vec![tag.to_string()];
    let mut current = tag;
    while let Some(idx) = current.rfind('-') {
        current = &current[..idx];
        chain.push(current.to_string());
    }
    chain.push(NEUTRAL.to_string());
    chain
}
