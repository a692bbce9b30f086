//! Resource catalog
//!
//! Discovers resources, groups them into locale buckets, loads one engine per
//! resource (imports resolved from the resource's own locale bucket), and
//! hands out dispatchers over the shared registry. All file reads happen
//! while the catalog is being built.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dispatcher::{CandidateDispatcher, EntryDispatcher, EntryMap};
use crate::engine::{EngineLoader, EngineRegistry};
use crate::error::Result;
use crate::grouper::{LocaleBuckets, ResourceGrouper};
use crate::hbs::HandlebarsLoader;
use crate::import::BucketImportResolver;
use crate::policy::LocalePolicy;
use crate::resolver::resolve;
use crate::resource::{FsSource, NameParser, ResourceSource};

/// Options for building a [`Catalog`]
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Resource name parser (extension)
    pub parser: NameParser,
    /// Fail rendering on missing template variables
    pub strict_templates: bool,
}

/// Grouped, loaded resources ready for dispatch
pub struct Catalog {
    policy: Arc<LocalePolicy>,
    parser: NameParser,
    source: Arc<dyn ResourceSource>,
    loader: Arc<dyn EngineLoader>,
    registry: Arc<EngineRegistry>,
    resources: Vec<String>,
    buckets: Arc<LocaleBuckets>,
}

impl Catalog {
    /// Build a catalog from every matching file under `dir`
    pub fn open(dir: impl AsRef<Path>, policy: Arc<LocalePolicy>, options: CatalogOptions) -> Result<Self> {
        let dir = dir.as_ref();
        debug!(?dir, "Catalog::open: called");
        let source = FsSource::new(dir);
        let resources = source.discover(&options.parser)?;
        info!("Discovered {} resources under {}", resources.len(), dir.display());

        let source: Arc<dyn ResourceSource> = Arc::new(source);
        let loader = Arc::new(HandlebarsLoader::new(source.clone()).strict(options.strict_templates));
        Self::build(source, resources, policy, options.parser, loader)
    }

    /// Build a catalog over `resources` read from `source` through `loader`
    pub fn build(
        source: Arc<dyn ResourceSource>,
        resources: Vec<String>,
        policy: Arc<LocalePolicy>,
        parser: NameParser,
        loader: Arc<dyn EngineLoader>,
    ) -> Result<Self> {
        let buckets = Arc::new(ResourceGrouper::new(&policy, &parser).group(&resources));
        let catalog = Self {
            policy,
            parser,
            source,
            loader,
            registry: Arc::new(EngineRegistry::new()),
            resources,
            buckets,
        };
        catalog.load_all()?;
        Ok(catalog)
    }

    fn load_all(&self) -> Result<()> {
        for resource in &self.resources {
            let language = self.parser.parse(resource).language;
            let imports = BucketImportResolver::new(
                self.source.clone(),
                self.policy.clone(),
                self.buckets.clone(),
                self.parser.clone(),
                &language,
            );
            self.registry.get_or_load(resource, self.loader.as_ref(), &imports)?;
        }
        info!("Loaded {} engines", self.registry.len());
        Ok(())
    }

    pub fn policy(&self) -> &Arc<LocalePolicy> {
        &self.policy
    }

    pub fn parser(&self) -> &NameParser {
        &self.parser
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn buckets(&self) -> &LocaleBuckets {
        &self.buckets
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Bucket locale serving `locale`
    pub fn resolve(&self, locale: &str) -> Result<&str> {
        resolve(&self.policy, locale, self.buckets.as_ref())
    }

    /// Dispatcher probing the locale variants of `base`
    pub fn candidate_dispatcher(&self, base: &str) -> CandidateDispatcher {
        CandidateDispatcher::new(
            self.policy.clone(),
            self.registry.clone(),
            self.parser.clone(),
            base,
        )
    }

    /// Dispatcher using, per bucket, the resource whose prefix is `entry_prefix`
    pub fn entry_dispatcher(&self, entry_prefix: &str) -> EntryDispatcher {
        let entries = EntryMap::from_buckets(&self.buckets, entry_prefix, &self.parser);
        EntryDispatcher::new(
            self.policy.clone(),
            entries,
            self.registry.clone(),
            self.loader.clone(),
            self.source.clone(),
            self.parser.clone(),
        )
    }
}
