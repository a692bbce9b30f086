//! Fallback resolution against a set of available locales

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{LgError, Result};
use crate::grouper::LocaleBuckets;
use crate::policy::LocalePolicy;

/// A collection keyed by locale tag
///
/// Lookups are case-insensitive and return the key as spelled in the
/// collection, so callers can index back into it.
pub trait LocaleKeys {
    fn find_locale(&self, tag: &str) -> Option<&str>;
}

fn find_in<'a, I>(keys: I, tag: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    keys.into_iter()
        .find(|key| key.eq_ignore_ascii_case(tag))
        .map(String::as_str)
}

impl<V> LocaleKeys for HashMap<String, V> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        match self.get_key_value(tag) {
            Some((key, _)) => Some(key.as_str()),
            None => find_in(self.keys(), tag),
        }
    }
}

impl<V> LocaleKeys for IndexMap<String, V> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        match self.get_key_value(tag) {
            Some((key, _)) => Some(key.as_str()),
            None => find_in(self.keys(), tag),
        }
    }
}

impl<V> LocaleKeys for BTreeMap<String, V> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        find_in(self.keys(), tag)
    }
}

impl LocaleKeys for HashSet<String> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        match self.get(tag) {
            Some(key) => Some(key.as_str()),
            None => find_in(self.iter(), tag),
        }
    }
}

impl LocaleKeys for IndexSet<String> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        find_in(self.iter(), tag)
    }
}

impl LocaleKeys for BTreeSet<String> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        find_in(self.iter(), tag)
    }
}

impl LocaleKeys for [String] {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        find_in(self.iter(), tag)
    }
}

impl LocaleKeys for Vec<String> {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        self.as_slice().find_locale(tag)
    }
}

impl LocaleKeys for [&str] {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        self.iter().copied().find(|key| key.eq_ignore_ascii_case(tag))
    }
}

impl<const N: usize> LocaleKeys for [&str; N] {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        self.as_slice().find_locale(tag)
    }
}

impl LocaleKeys for LocaleBuckets {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        self.locales().find(|key| key.eq_ignore_ascii_case(tag))
    }
}

/// Walks a policy's fallback chains against available locales
#[derive(Debug, Clone, Copy)]
pub struct FallbackResolver<'a> {
    policy: &'a LocalePolicy,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(policy: &'a LocalePolicy) -> Self {
        Self { policy }
    }

    /// First key of `available` along `locale`'s fallback chain
    ///
    /// An exact match of the requested locale wins even when the policy does
    /// not know it; otherwise the chain is walked strictly in order. Fails with
    /// [`LgError::NoFallbackAvailable`] when nothing matches.
    pub fn resolve<'k, K>(&self, locale: &str, available: &'k K) -> Result<&'k str>
    where
        K: LocaleKeys + ?Sized,
    {
        debug!(%locale, "FallbackResolver::resolve: called");
        if let Some(key) = available.find_locale(locale) {
            debug!(%locale, %key, "FallbackResolver::resolve: exact match");
            return Ok(key);
        }

        for tag in self.policy.chain_for(locale)? {
            if let Some(key) = available.find_locale(tag) {
                debug!(%locale, %key, "FallbackResolver::resolve: fallback match");
                return Ok(key);
            }
        }

        debug!(%locale, "FallbackResolver::resolve: no match");
        Err(LgError::NoFallbackAvailable {
            locale: locale.to_string(),
        })
    }

    /// Every key of `available` along the chain, in fallback order
    pub fn resolve_all<'k, K>(&self, locale: &str, available: &'k K) -> Result<Vec<&'k str>>
    where
        K: LocaleKeys + ?Sized,
    {
        let mut keys: Vec<&'k str> = Vec::new();
        if let Some(key) = available.find_locale(locale) {
            keys.push(key);
        }
        for tag in self.policy.chain_for(locale)? {
            if let Some(key) = available.find_locale(tag)
                && !keys.contains(&key)
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Resolve `locale` against `available` using `policy`
pub fn resolve<'k, K>(policy: &LocalePolicy, locale: &str, available: &'k K) -> Result<&'k str>
where
    K: LocaleKeys + ?Sized,
{
    FallbackResolver::new(policy).resolve(locale, available)
}
