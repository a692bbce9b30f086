//! Multi-locale template dispatch
//!
//! Both strategies share one entry point, [`Render::render`], taking the
//! template name, optional data and the requested locale:
//!
//! - [`EntryDispatcher`] keeps one entry resource per locale and evaluates the
//!   engine of the entry reached through the fallback chain.
//! - [`CandidateDispatcher`] builds the locale-suffixed variants of a base
//!   resource for the whole fallback chain and evaluates the first registered
//!   engine that renders without a template error.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::{EngineHandle, EngineLoader, EngineRegistry};
use crate::error::{Diagnostic, LgError, Result};
use crate::grouper::LocaleBuckets;
use crate::import::FallbackImportResolver;
use crate::policy::{LocalePolicy, normalize_tag};
use crate::resolver::{FallbackResolver, LocaleKeys};
use crate::resource::{NameParser, ResourceSource};

/// Outcome of a render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered text, empty when no candidate succeeded
    pub text: String,
    /// Resource whose engine produced `text`
    pub resource: Option<String>,
    /// Locale tag the resource was selected for
    pub locale: Option<String>,
    /// Template errors from candidates tried before (or instead of) the winner
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    /// Whether no engine produced output
    pub fn is_fallback(&self) -> bool {
        self.resource.is_none()
    }
}

/// Renders a named template for a requested locale
pub trait Render: Send + Sync {
    fn render(&self, template_name: &str, data: Option<&Value>, locale: &str) -> Result<Rendered>;
}

/// Locale -> designated entry resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMap {
    entries: IndexMap<String, String>,
}

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry resource for `locale`
    pub fn insert(&mut self, locale: &str, resource: impl Into<String>) {
        self.entries.insert(normalize_tag(locale), resource.into());
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.entries.get(&normalize_tag(locale)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry per bucket: the bucket member whose prefix is `entry_prefix`
    ///
    /// Buckets without such a member get no entry.
    pub fn from_buckets(buckets: &LocaleBuckets, entry_prefix: &str, parser: &NameParser) -> Self {
        let mut map = Self::new();
        for locale in buckets.locales() {
            if let Some(resource) = buckets.find_by_prefix(locale, entry_prefix, parser) {
                map.insert(locale, resource);
            }
        }
        debug!(%entry_prefix, entries = map.len(), "EntryMap::from_buckets: built");
        map
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for EntryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (locale, resource) in iter {
            map.insert(locale.as_ref(), resource);
        }
        map
    }
}

impl LocaleKeys for EntryMap {
    fn find_locale(&self, tag: &str) -> Option<&str> {
        self.entries.find_locale(&normalize_tag(tag))
    }
}

/// One engine per locale, selected through the entry map
pub struct EntryDispatcher {
    policy: Arc<LocalePolicy>,
    entries: EntryMap,
    registry: Arc<EngineRegistry>,
    loader: Arc<dyn EngineLoader>,
    source: Arc<dyn ResourceSource>,
    parser: NameParser,
}

impl EntryDispatcher {
    pub fn new(
        policy: Arc<LocalePolicy>,
        entries: EntryMap,
        registry: Arc<EngineRegistry>,
        loader: Arc<dyn EngineLoader>,
        source: Arc<dyn ResourceSource>,
        parser: NameParser,
    ) -> Self {
        Self {
            policy,
            entries,
            registry,
            loader,
            source,
            parser,
        }
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    /// Load the engine of every entry up front
    pub fn warm(&self) -> Result<()> {
        for (_, resource) in self.entries.iter() {
            self.engine_for(resource)?;
        }
        Ok(())
    }

    /// Locale key and entry resource serving `locale`
    pub fn entry_for(&self, locale: &str) -> Result<(&str, &str)> {
        let key = FallbackResolver::new(&self.policy)
            .resolve(locale, &self.entries)
            .map_err(|e| match e {
                LgError::NoFallbackAvailable { locale } => LgError::NoEntryForLocale { locale },
                other => other,
            })?;
        let resource = self.entries.get(key).ok_or_else(|| LgError::NoEntryForLocale {
            locale: locale.to_string(),
        })?;
        Ok((key, resource))
    }

    fn engine_for(&self, resource: &str) -> Result<EngineHandle> {
        // imports follow the entry file's own locale suffix
        let language = self.parser.parse(resource).language;
        let imports = FallbackImportResolver::new(
            self.source.clone(),
            self.policy.clone(),
            self.parser.clone(),
            &language,
        );
        self.registry.get_or_load(resource, self.loader.as_ref(), &imports)
    }
}

impl Render for EntryDispatcher {
    fn render(&self, template_name: &str, data: Option<&Value>, locale: &str) -> Result<Rendered> {
        debug!(%template_name, %locale, "EntryDispatcher::render: called");
        let (key, resource) = self.entry_for(locale)?;
        let engine = self.engine_for(resource)?;

        let text = engine
            .evaluate(template_name, data.unwrap_or(&Value::Null))
            .map_err(|message| LgError::TemplateEvaluation {
                template: template_name.to_string(),
                diagnostics: vec![Diagnostic {
                    resource: resource.to_string(),
                    locale: key.to_string(),
                    message,
                }],
            })?;

        Ok(Rendered {
            text,
            resource: Some(resource.to_string()),
            locale: Some(key.to_string()),
            diagnostics: Vec::new(),
        })
    }
}

/// Probes locale variants of a base resource in fallback order
pub struct CandidateDispatcher {
    policy: Arc<LocalePolicy>,
    registry: Arc<EngineRegistry>,
    parser: NameParser,
    base: String,
    strict: bool,
}

impl CandidateDispatcher {
    pub fn new(policy: Arc<LocalePolicy>, registry: Arc<EngineRegistry>, parser: NameParser, base: &str) -> Self {
        Self {
            policy,
            registry,
            parser,
            base: base.to_string(),
            strict: false,
        }
    }

    /// Return an error instead of an empty result when every candidate fails
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `(locale tag, resource id)` candidates for `locale`, most specific first
    ///
    /// The requested locale leads even when the policy does not list it.
    pub fn candidates(&self, locale: &str) -> Result<Vec<(String, String)>> {
        let requested = normalize_tag(locale);
        let chain = self.policy.chain_for(locale)?;

        let mut tags: Vec<&str> = Vec::with_capacity(chain.len() + 1);
        if !requested.is_empty() && !chain.contains(&requested) {
            tags.push(&requested);
        }
        tags.extend(chain.iter().map(String::as_str));

        Ok(tags
            .into_iter()
            .map(|tag| (tag.to_string(), self.parser.localize(&self.base, tag)))
            .collect())
    }
}

impl Render for CandidateDispatcher {
    fn render(&self, template_name: &str, data: Option<&Value>, locale: &str) -> Result<Rendered> {
        debug!(%template_name, %locale, base = %self.base, "CandidateDispatcher::render: called");
        let data = data.unwrap_or(&Value::Null);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut probed_any = false;

        for (tag, resource) in self.candidates(locale)? {
            let Some(engine) = self.registry.get(&resource) else {
                debug!(%resource, "CandidateDispatcher::render: no engine registered");
                continue;
            };
            probed_any = true;

            match engine.evaluate(template_name, data) {
                Ok(text) => {
                    debug!(%resource, %tag, "CandidateDispatcher::render: evaluated");
                    return Ok(Rendered {
                        text,
                        resource: Some(resource),
                        locale: Some(tag),
                        diagnostics,
                    });
                }
                Err(message) => {
                    debug!(%resource, %message, "CandidateDispatcher::render: template error, trying next candidate");
                    diagnostics.push(Diagnostic {
                        resource,
                        locale: tag,
                        message,
                    });
                }
            }
        }

        if !probed_any {
            warn!("No engine registered for {} along the fallback chain of '{}'", self.base, locale);
            if self.strict {
                return Err(LgError::NoFallbackAvailable {
                    locale: locale.to_string(),
                });
            }
        } else {
            for diagnostic in &diagnostics {
                warn!("Template '{}' failed: {}", template_name, diagnostic);
            }
            if self.strict {
                return Err(LgError::TemplateEvaluation {
                    template: template_name.to_string(),
                    diagnostics,
                });
            }
        }

        Ok(Rendered {
            diagnostics,
            ..Rendered::default()
        })
    }
}
