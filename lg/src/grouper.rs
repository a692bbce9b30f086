//! Locale bucketing of resources
//!
//! Resources are grouped per policy locale by walking each locale's fallback
//! chain, so the `en-us` bucket holds `*.en-us.lg`, then any `*.en.lg` not
//! already covered, then neutral `*.lg` files. Buckets that end up with the
//! same resource pool are then collapsed under their closest common ancestor:
//!
//! ```text
//! en-us -> [a.en.lg, b.lg]        en -> [a.en.lg, b.lg]
//! en-gb -> [a.en.lg, b.lg]   =>
//! ```
//!
//! File suffixes are compared case-insensitively but otherwise as written.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::policy::{LocalePolicy, NEUTRAL, normalize_tag};
use crate::resource::{NameParser, ParsedName};

/// Resources serving each locale, in policy order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocaleBuckets {
    buckets: IndexMap<String, Vec<String>>,
}

impl LocaleBuckets {
    /// Resources for exactly `locale` (no fallback)
    pub fn get(&self, locale: &str) -> Option<&[String]> {
        self.buckets.get(&normalize_tag(locale)).map(Vec::as_slice)
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.buckets.contains_key(&normalize_tag(locale))
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Every resource that appears in some bucket, first occurrence order
    pub fn resources(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.buckets
            .values()
            .flatten()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    /// Resource in `locale`'s bucket whose prefix matches `prefix` (case-insensitive)
    pub fn find_by_prefix(&self, locale: &str, prefix: &str, parser: &NameParser) -> Option<&str> {
        self.get(locale)?
            .iter()
            .find(|name| parser.parse(name).prefix.eq_ignore_ascii_case(prefix))
            .map(String::as_str)
    }
}

/// Groups resource names into collapsed locale buckets
#[derive(Debug, Clone, Copy)]
pub struct ResourceGrouper<'a> {
    policy: &'a LocalePolicy,
    parser: &'a NameParser,
}

impl<'a> ResourceGrouper<'a> {
    pub fn new(policy: &'a LocalePolicy, parser: &'a NameParser) -> Self {
        Self { policy, parser }
    }

    /// Bucket `names` by locale and collapse identical pools
    pub fn group<S: AsRef<str>>(&self, names: &[S]) -> LocaleBuckets {
        debug!(count = names.len(), "ResourceGrouper::group: called");
        let parsed: Vec<(&str, ParsedName)> = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let mut parsed = self.parser.parse(name);
                // case-folded only; dispatch probes the suffix as written
                parsed.language = parsed.language.trim().to_lowercase();
                (name, parsed)
            })
            .collect();

        let mut raw = IndexMap::new();
        for (locale, chain) in self.policy.iter() {
            let bucket = self.fill_bucket(locale, chain, &parsed);
            if !bucket.is_empty() {
                raw.insert(locale.to_string(), bucket);
            }
        }
        debug!(buckets = raw.len(), "ResourceGrouper::group: filled buckets before collapse");

        let buckets = self.collapse(raw);
        info!(
            "Grouped {} resources into {} locale buckets",
            names.len(),
            buckets.len()
        );
        LocaleBuckets { buckets }
    }

    fn fill_bucket(&self, locale: &str, chain: &[String], parsed: &[(&str, ParsedName)]) -> Vec<String> {
        let mut bucket: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for suffix in chain {
            // neutral files only extend a non-neutral bucket that already has content
            if suffix.is_empty() && !locale.is_empty() && bucket.is_empty() {
                continue;
            }
            for (name, parsed_name) in parsed {
                if parsed_name.language != *suffix {
                    continue;
                }
                if seen.insert(parsed_name.prefix.to_lowercase()) {
                    bucket.push((*name).to_string());
                }
            }
        }

        bucket
    }

    /// Merge buckets with identical pools, first seen wins
    ///
    /// When a later bucket has the same pool as an accepted one, the accepted
    /// key is rewritten in place to the common ancestor of both. Otherwise
    /// (neutral ancestor, the accepted key itself, or an ancestor already
    /// holding another pool) both buckets are kept.
    fn collapse(&self, raw: IndexMap<String, Vec<String>>) -> IndexMap<String, Vec<String>> {
        let mut accepted: IndexMap<String, (Vec<String>, Vec<String>)> = IndexMap::new();

        for (locale, pool) in raw {
            let signature = pool_signature(&pool);
            let existing = accepted
                .iter()
                .find(|(_, (_, sig))| *sig == signature)
                .map(|(key, _)| key.clone());

            let Some(existing) = existing else {
                accepted.insert(locale, (pool, signature));
                continue;
            };

            let ancestor = self.policy.ancestor(&existing, &locale);
            if ancestor == NEUTRAL || ancestor == existing || accepted.contains_key(&ancestor) {
                debug!(%locale, %existing, %ancestor, "ResourceGrouper::collapse: keeping distinct bucket");
                accepted.insert(locale, (pool, signature));
            } else if let Some((index, _, _)) = accepted.shift_remove_full(&existing) {
                debug!(%locale, %existing, %ancestor, "ResourceGrouper::collapse: rekeying to common ancestor");
                accepted.shift_insert(index, ancestor, (pool, signature));
            }
        }

        accepted.into_iter().map(|(key, (pool, _))| (key, pool)).collect()
    }
}

/// Group `names` with the default `.lg` parser
pub fn group_by_locale<S: AsRef<str>>(policy: &LocalePolicy, names: &[S]) -> LocaleBuckets {
    ResourceGrouper::new(policy, &NameParser::default()).group(names)
}

fn pool_signature(pool: &[String]) -> Vec<String> {
    let mut signature = pool.to_vec();
    signature.sort();
    signature.dedup();
    signature
}
