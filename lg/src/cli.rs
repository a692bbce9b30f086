//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lgf - locale fallback for multi-locale template collections
#[derive(Debug, Parser)]
#[command(
    name = "lgf",
    about = "Resolve locale fallback chains and render multi-locale templates",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the fallback chain of a locale
    Chain {
        /// Locale tag, e.g. en-US
        locale: String,
    },

    /// Discover resources and print their locale buckets
    Group {
        /// Resource directory (overrides config `resources`)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Resolve a locale against the available locales
    Resolve {
        /// Locale tag to resolve
        locale: String,

        /// Comma-separated available locales (default: discovered buckets)
        #[arg(short, long, value_delimiter = ',')]
        available: Option<Vec<String>>,

        /// Resource directory (overrides config `resources`)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Render a template for a locale
    Render {
        /// Template name
        template: String,

        /// Requested locale
        #[arg(short = 'L', long, default_value = "")]
        locale: String,

        /// Template data as JSON
        #[arg(long)]
        data: Option<String>,

        /// Base resource probed across the fallback chain
        #[arg(short, long, conflicts_with = "entry")]
        base: Option<String>,

        /// Entry resource prefix selected per locale bucket
        #[arg(short, long)]
        entry: Option<String>,

        /// Fail instead of printing empty output
        #[arg(long)]
        strict: bool,

        /// Treat missing template variables as template errors
        #[arg(long)]
        strict_templates: bool,

        /// Resource directory (overrides config `resources`)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "lgf", "render", "Greeting", "--locale", "fr-FR", "--base", "Greet.lg", "--data", "{}",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                template,
                locale,
                base,
                entry,
                strict,
                strict_templates,
                ..
            } => {
                assert_eq!(template, "Greeting");
                assert_eq!(locale, "fr-FR");
                assert_eq!(base.as_deref(), Some("Greet.lg"));
                assert!(entry.is_none());
                assert!(!strict);
                assert!(!strict_templates);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_strict_flags_are_independent() {
        let cli = Cli::try_parse_from(["lgf", "render", "T", "--strict-templates"]).unwrap();
        match cli.command {
            Command::Render {
                strict, strict_templates, ..
            } => {
                assert!(!strict);
                assert!(strict_templates);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_base_conflicts_with_entry() {
        let result = Cli::try_parse_from(["lgf", "render", "T", "--base", "a.lg", "--entry", "main"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_available_list() {
        let cli = Cli::try_parse_from(["lgf", "-l", "debug", "resolve", "en-us", "--available", "en,fr"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Resolve { available, .. } => {
                assert_eq!(available, Some(vec!["en".to_string(), "fr".to_string()]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
