//! lgf - locale fallback for multi-locale template collections
//!
//! CLI entry point for inspecting fallback chains and locale buckets and for
//! rendering templates with locale fallback.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::{debug, info};

use lgfallback::cli::{Cli, Command};
use lgfallback::config::{Config, Strategy};
use lgfallback::{Catalog, CatalogOptions, LocalePolicy, NameParser, Render, Rendered, resolve};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn display_tag(tag: &str) -> String {
    if tag.is_empty() {
        "<neutral>".to_string()
    } else {
        tag.to_string()
    }
}

fn open_catalog(config: &Config, policy: LocalePolicy, dir: Option<PathBuf>, strict_templates: bool) -> Result<Catalog> {
    let dir = dir.unwrap_or_else(|| config.resources.clone());
    let options = CatalogOptions {
        parser: NameParser::new(&config.extension),
        strict_templates,
    };
    Catalog::open(&dir, Arc::new(policy), options)
        .context(format!("Failed to load resources from {}", dir.display()))
}

fn cmd_chain(policy: &LocalePolicy, locale: &str) -> Result<()> {
    let chain = policy.chain_for(locale)?;
    let chain: Vec<String> = chain.iter().map(|tag| display_tag(tag)).collect();
    println!("{} {}", locale.cyan(), chain.join(" -> "));
    Ok(())
}

fn cmd_group(config: &Config, policy: LocalePolicy, dir: Option<PathBuf>) -> Result<()> {
    let catalog = open_catalog(config, policy, dir, false)?;
    if catalog.buckets().is_empty() {
        println!("No resources found");
        return Ok(());
    }
    for (locale, resources) in catalog.buckets().iter() {
        println!("{}", display_tag(locale).cyan());
        for resource in resources {
            println!("  {}", resource);
        }
    }
    Ok(())
}

fn cmd_resolve(config: &Config, policy: LocalePolicy, locale: &str, available: Option<Vec<String>>, dir: Option<PathBuf>) -> Result<()> {
    let key = match available {
        Some(available) => resolve(&policy, locale, &available)?.to_string(),
        None => {
            let catalog = open_catalog(config, policy, dir, false)?;
            catalog.resolve(locale)?.to_string()
        }
    };
    println!("{}", display_tag(&key));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    config: &Config,
    policy: LocalePolicy,
    template: &str,
    locale: &str,
    data: Option<String>,
    base: Option<String>,
    entry: Option<String>,
    strict: bool,
    strict_templates: bool,
    dir: Option<PathBuf>,
) -> Result<()> {
    let data: Option<Value> = match data {
        Some(raw) => Some(serde_json::from_str(&raw).context("Failed to parse --data as JSON")?),
        None => None,
    };
    let strict = strict || config.strict;
    let strict_templates = strict_templates || config.strict_templates;

    // explicit flags win over the configured strategy
    let strategy = match (&base, &entry) {
        (Some(_), _) => Strategy::Candidates,
        (None, Some(_)) => Strategy::Entry,
        (None, None) => config.strategy,
    };
    debug!(?strategy, %template, %locale, "cmd_render: called");

    let catalog = open_catalog(config, policy, dir, strict_templates)?;
    let rendered: Rendered = match strategy {
        Strategy::Candidates => {
            let base = base
                .or_else(|| config.base.clone())
                .ok_or_else(|| eyre!("No base resource: pass --base or set `base` in the config"))?;
            catalog
                .candidate_dispatcher(&base)
                .strict(strict)
                .render(template, data.as_ref(), locale)?
        }
        Strategy::Entry => {
            let entry = entry
                .or_else(|| config.entry.clone())
                .ok_or_else(|| eyre!("No entry prefix: pass --entry or set `entry` in the config"))?;
            catalog.entry_dispatcher(&entry).render(template, data.as_ref(), locale)?
        }
    };

    for diagnostic in &rendered.diagnostics {
        eprintln!("{} {}", "warning:".yellow(), diagnostic);
    }
    match &rendered.resource {
        Some(resource) => info!("Rendered '{}' from {}", template, resource),
        None => eprintln!("{} no candidate rendered '{}'", "warning:".yellow(), template),
    }
    println!("{}", rendered.text);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    debug!(?config, "main: configuration loaded");

    let policy = config.policy();

    match cli.command {
        Command::Chain { locale } => cmd_chain(&policy, &locale),
        Command::Group { dir } => cmd_group(&config, policy, dir),
        Command::Resolve { locale, available, dir } => cmd_resolve(&config, policy, &locale, available, dir),
        Command::Render {
            template,
            locale,
            data,
            base,
            entry,
            strict,
            strict_templates,
            dir,
        } => cmd_render(
            &config,
            policy,
            &template,
            &locale,
            data,
            base,
            entry,
            strict,
            strict_templates,
            dir,
        ),
    }
}
