//! Handlebars-backed template engine
//!
//! A resource file is a list of named sections; each section body is a
//! Handlebars template. Lines that consist of a single link are imports,
//! resolved through the locale-aware [`ImportResolve`] of the loading locale:
//!
//! ```text
//! > comment
//! [Common](common.lg)
//!
//! # Greeting
//! - Hello {{name}}!
//! ```
//!
//! A leading `- ` on body lines is dropped. Templates defined in the resource
//! itself override imported templates with the same name.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use handlebars::Handlebars;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::engine::{EngineHandle, EngineLoader, TemplateEngine};
use crate::error::{LgError, Result};
use crate::import::ImportResolve;
use crate::resource::ResourceSource;

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]\(([^)]+)\)$").expect("import pattern is valid"));

/// Sections and imports of one resource file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDocument {
    /// Import references in file order
    pub imports: Vec<String>,
    /// `(name, body)` pairs in file order
    pub templates: Vec<(String, String)>,
}

impl TemplateDocument {
    /// Split `content` into imports and named template bodies
    pub fn parse(resource: &str, content: &str) -> Result<Self> {
        let mut doc = TemplateDocument::default();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('>') {
                continue;
            }

            if let Some(caps) = IMPORT_LINE.captures(trimmed) {
                doc.imports.push(caps[1].trim().to_string());
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('#') {
                if let Some((name, body)) = current.take() {
                    doc.templates.push((name, join_body(&body)));
                }
                let name = header.split('(').next().unwrap_or_default().trim();
                if name.is_empty() {
                    return Err(LgError::TemplateParse {
                        resource: resource.to_string(),
                        name: String::new(),
                        message: "template header without a name".to_string(),
                    });
                }
                current = Some((name.to_string(), Vec::new()));
                continue;
            }

            if let Some((_, body)) = current.as_mut() {
                let line = line.trim_end();
                let line = match line.trim_start().strip_prefix("- ") {
                    Some(rest) => rest,
                    None => line,
                };
                body.push(line.to_string());
            }
        }

        if let Some((name, body)) = current.take() {
            doc.templates.push((name, join_body(&body)));
        }

        debug!(
            %resource,
            imports = doc.imports.len(),
            templates = doc.templates.len(),
            "TemplateDocument::parse: parsed"
        );
        Ok(doc)
    }
}

fn join_body(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// Templates of one resource (plus its imports) registered with Handlebars
pub struct HandlebarsEngine {
    id: String,
    hbs: Handlebars<'static>,
}

impl HandlebarsEngine {
    /// Register `templates` (`name -> body`) under a new engine for `id`
    pub fn new(id: &str, templates: &IndexMap<String, String>, strict: bool) -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(strict);
        hbs.register_escape_fn(handlebars::no_escape);

        for (name, body) in templates {
            hbs.register_template_string(name, body)
                .map_err(|e| LgError::TemplateParse {
                    resource: id.to_string(),
                    name: name.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self { id: id.to_string(), hbs })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn evaluate(&self, template: &str, data: &Value) -> std::result::Result<String, String> {
        debug!(id = %self.id, %template, "HandlebarsEngine::evaluate: called");
        if !self.hbs.has_template(template) {
            return Err(format!("Template not found: {}", template));
        }
        self.hbs
            .render(template, data)
            .map_err(|e| format!("Failed to render template {}: {}", template, e))
    }

    fn templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hbs.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Loads [`HandlebarsEngine`]s from a [`ResourceSource`]
#[derive(Clone)]
pub struct HandlebarsLoader {
    source: Arc<dyn ResourceSource>,
    strict: bool,
}

impl HandlebarsLoader {
    pub fn new(source: Arc<dyn ResourceSource>) -> Self {
        Self { source, strict: false }
    }

    /// Fail rendering on missing variables instead of rendering them empty
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn collect(
        &self,
        id: &str,
        content: &str,
        imports: &dyn ImportResolve,
        visited: &mut HashSet<String>,
        templates: &mut IndexMap<String, String>,
    ) -> Result<()> {
        let doc = TemplateDocument::parse(id, content)?;

        for reference in &doc.imports {
            let resolved = imports.resolve(id, reference)?;
            if visited.insert(resolved.id.to_lowercase()) {
                debug!(%id, import = %resolved.id, "HandlebarsLoader::collect: following import");
                self.collect(&resolved.id, &resolved.content, imports, visited, templates)?;
            }
        }

        for (name, body) in doc.templates {
            templates.insert(name, body);
        }
        Ok(())
    }
}

impl EngineLoader for HandlebarsLoader {
    fn load(&self, resource_id: &str, imports: &dyn ImportResolve) -> Result<EngineHandle> {
        debug!(%resource_id, "HandlebarsLoader::load: called");
        let content = self.source.read(resource_id)?;

        let mut visited = HashSet::from([resource_id.to_lowercase()]);
        let mut templates = IndexMap::new();
        self.collect(resource_id, &content, imports, &mut visited, &mut templates)?;

        let engine = HandlebarsEngine::new(resource_id, &templates, self.strict)?;
        info!("Loaded {} templates from {}", templates.len(), resource_id);
        Ok(Arc::new(engine))
    }
}
