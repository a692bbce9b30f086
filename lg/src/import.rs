//! Locale-aware import resolution
//!
//! A resource may import another by reference (`[Common](common.lg)`). Which
//! file actually satisfies the import depends on the importing resource's
//! locale:
//!
//! - [`FallbackImportResolver`] tries `common.{tag}.lg` for every tag of the
//!   locale's fallback chain, ending with the bare `common.lg`.
//! - [`BucketImportResolver`] picks the locale's bucket (with fallback) and
//!   returns the bucket member that shares the reference's prefix.

use std::sync::Arc;

use tracing::debug;

use crate::error::{LgError, Result};
use crate::grouper::LocaleBuckets;
use crate::policy::LocalePolicy;
use crate::resolver::resolve;
use crate::resource::{NameParser, ResourceSource, file_name, join_relative};

/// Content and identifier of a resolved import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub content: String,
    pub id: String,
}

/// Resolves an import reference made by `source_id`
pub trait ImportResolve: Send + Sync {
    fn resolve(&self, source_id: &str, reference: &str) -> Result<ResolvedImport>;
}

/// Resolves imports by probing locale-suffixed file names down the fallback chain
#[derive(Clone)]
pub struct FallbackImportResolver {
    source: Arc<dyn ResourceSource>,
    policy: Arc<LocalePolicy>,
    parser: NameParser,
    locale: String,
}

impl FallbackImportResolver {
    pub fn new(source: Arc<dyn ResourceSource>, policy: Arc<LocalePolicy>, parser: NameParser, locale: &str) -> Self {
        Self {
            source,
            policy,
            parser,
            locale: locale.to_string(),
        }
    }

    /// Candidate identifiers for `reference` imported from `source_id`, in probe order
    pub fn candidates(&self, source_id: &str, reference: &str) -> Result<Vec<String>> {
        let path = join_relative(source_id, reference);
        let chain = self.policy.chain_for(&self.locale)?;
        let mut candidates: Vec<String> = Vec::with_capacity(chain.len());
        for tag in chain {
            let candidate = self.parser.localize(&path, tag);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }
}

impl ImportResolve for FallbackImportResolver {
    fn resolve(&self, source_id: &str, reference: &str) -> Result<ResolvedImport> {
        debug!(%source_id, %reference, locale = %self.locale, "FallbackImportResolver::resolve: called");
        for candidate in self.candidates(source_id, reference)? {
            if self.source.exists(&candidate) {
                debug!(%candidate, "FallbackImportResolver::resolve: found");
                let content = self.source.read(&candidate)?;
                return Ok(ResolvedImport { content, id: candidate });
            }
        }

        Err(LgError::ImportNotFound {
            source_id: source_id.to_string(),
            reference: reference.to_string(),
            locale: self.locale.clone(),
        })
    }
}

/// Resolves imports from the grouped bucket serving a locale
#[derive(Clone)]
pub struct BucketImportResolver {
    source: Arc<dyn ResourceSource>,
    policy: Arc<LocalePolicy>,
    buckets: Arc<LocaleBuckets>,
    parser: NameParser,
    locale: String,
}

impl BucketImportResolver {
    pub fn new(
        source: Arc<dyn ResourceSource>,
        policy: Arc<LocalePolicy>,
        buckets: Arc<LocaleBuckets>,
        parser: NameParser,
        locale: &str,
    ) -> Self {
        Self {
            source,
            policy,
            buckets,
            parser,
            locale: locale.to_string(),
        }
    }

    fn not_found(&self, source_id: &str, reference: &str) -> LgError {
        LgError::ImportNotFound {
            source_id: source_id.to_string(),
            reference: reference.to_string(),
            locale: self.locale.clone(),
        }
    }
}

impl ImportResolve for BucketImportResolver {
    fn resolve(&self, source_id: &str, reference: &str) -> Result<ResolvedImport> {
        debug!(%source_id, %reference, locale = %self.locale, "BucketImportResolver::resolve: called");
        let bucket = resolve(&self.policy, &self.locale, self.buckets.as_ref())
            .map_err(|_| self.not_found(source_id, reference))?;

        let prefix = self.parser.parse(file_name(&reference.replace('\\', "/"))).prefix;
        let Some(resource) = self.buckets.find_by_prefix(bucket, &prefix, &self.parser) else {
            debug!(%bucket, %prefix, "BucketImportResolver::resolve: no resource with prefix");
            return Err(self.not_found(source_id, reference));
        };

        debug!(%bucket, %resource, "BucketImportResolver::resolve: found");
        let content = self.source.read(resource)?;
        Ok(ResolvedImport {
            content,
            id: resource.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouper::ResourceGrouper;
    use crate::resource::MemorySource;

    fn fr_policy() -> Arc<LocalePolicy> {
        Arc::new(
            LocalePolicy::new([("", vec![""]), ("fr-fr", vec!["fr-fr", "fr", ""]), ("fr", vec!["fr", ""])]).unwrap(),
        )
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with("dialogs/main.fr-fr.lg", "[Common](common.lg)")
            .with("dialogs/common.lg", "neutral")
            .with("dialogs/common.fr.lg", "french")
    }

    #[test]
    fn test_fallback_candidates_in_chain_order() {
        let resolver = FallbackImportResolver::new(Arc::new(source()), fr_policy(), NameParser::default(), "fr-fr");
        let candidates = resolver.candidates("dialogs/main.fr-fr.lg", "common.lg").unwrap();
        assert_eq!(
            candidates,
            ["dialogs/common.fr-fr.lg", "dialogs/common.fr.lg", "dialogs/common.lg"]
        );
    }

    #[test]
    fn test_fallback_picks_most_specific_existing() {
        let resolver = FallbackImportResolver::new(Arc::new(source()), fr_policy(), NameParser::default(), "fr-fr");
        let resolved = resolver.resolve("dialogs/main.fr-fr.lg", "common.lg").unwrap();
        assert_eq!(resolved.id, "dialogs/common.fr.lg");
        assert_eq!(resolved.content, "french");
    }

    #[test]
    fn test_fallback_neutral_locale_uses_bare_name() {
        let resolver = FallbackImportResolver::new(Arc::new(source()), fr_policy(), NameParser::default(), "");
        let resolved = resolver.resolve("dialogs/main.lg", "common.lg").unwrap();
        assert_eq!(resolved.id, "dialogs/common.lg");
        assert_eq!(resolved.content, "neutral");
    }

    #[test]
    fn test_fallback_missing_import_fails() {
        let resolver = FallbackImportResolver::new(Arc::new(source()), fr_policy(), NameParser::default(), "fr");
        let result = resolver.resolve("dialogs/main.lg", "missing.lg");
        assert!(matches!(result, Err(LgError::ImportNotFound { reference, .. }) if reference == "missing.lg"));
    }

    #[test]
    fn test_bucket_resolver_finds_by_prefix() {
        let source = MemorySource::new()
            .with("Main.fr.lg", "[Common](Common.lg)")
            .with("Common.fr.lg", "french")
            .with("Common.lg", "neutral")
            .with("Main.lg", "[Common](Common.lg)");
        let policy = fr_policy();
        let parser = NameParser::default();
        let buckets = Arc::new(ResourceGrouper::new(&policy, &parser).group(&source.ids()));

        let resolver = BucketImportResolver::new(Arc::new(source.clone()), policy.clone(), buckets.clone(), parser.clone(), "fr-fr");
        let resolved = resolver.resolve("Main.fr.lg", "./common.lg").unwrap();
        assert_eq!(resolved.id, "Common.fr.lg");
        assert_eq!(resolved.content, "french");

        let resolver = BucketImportResolver::new(Arc::new(source), policy, buckets, parser, "de");
        let resolved = resolver.resolve("Main.lg", "Common.lg").unwrap();
        assert_eq!(resolved.id, "Common.lg");
    }

    #[test]
    fn test_bucket_resolver_unknown_prefix_fails() {
        let source = MemorySource::new().with("Main.lg", "");
        let policy = fr_policy();
        let parser = NameParser::default();
        let buckets = Arc::new(ResourceGrouper::new(&policy, &parser).group(&source.ids()));
        let resolver = BucketImportResolver::new(Arc::new(source), policy, buckets, parser, "fr");
        assert!(matches!(
            resolver.resolve("Main.lg", "Other.lg"),
            Err(LgError::ImportNotFound { .. })
        ));
    }
}
