//! Command-line Arguments

use clap::{Parser, Subcommand};
use preload_engine::{CacheKey, PreloadOptions, Site};
use std::path::PathBuf;

/// `None` when omitted, `Some(None)` when given without a value.
pub type Flag = Option<Option<String>>;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Configuration file (defaults to `preload.toml` if present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
    /// Treat this run as a production build, whatever the configuration says
    #[arg(long, global = true)]
    pub production: bool,
    /// Log debug output
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Only log errors
    #[arg(long, short, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preload remote assets and print the path each one is served from
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Prefix served paths with an origin; without a value, the configured site is used
        #[arg(long, num_args = 0..=1, require_equals = true, value_name = "HOST")]
        site: Option<Option<String>>,
        /// Base name to store the artifact under, instead of a derived one
        #[arg(long)]
        name: Option<String>,
        /// Extension to store the artifact with, instead of the inferred one
        #[arg(long = "ext", value_name = "EXT")]
        file_ending: Option<String>,
        /// Download again even if the artifact already exists
        #[arg(long)]
        skip_cache: bool,
        /// Name artifacts after a hash of their content rather than their URL
        #[arg(long)]
        content_hash: bool,
    },
    /// Remove every preloaded artifact
    Clear,
    /// Copy preloaded artifacts into the output directory
    Copy,
}

pub fn site(flag: Flag) -> Site {
    match flag {
        Some(Some(origin)) if origin.trim().is_empty() => Site::Configured,
        Some(Some(origin)) => Site::Explicit(origin),
        Some(None) => Site::Configured,
        None => Site::None,
    }
}

pub fn options(
    site_flag: Flag,
    name: Option<String>,
    file_ending: Option<String>,
    skip_cache: bool,
    content_hash: bool,
) -> PreloadOptions {
    PreloadOptions {
        site: site(site_flag),
        override_name: name,
        override_file_ending: file_ending,
        skip_cache,
        cache_key: if content_hash { CacheKey::Content } else { CacheKey::Locator },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Site::None)]
    #[case(Some(None), Site::Configured)]
    #[case(Some(Some(String::new())), Site::Configured)]
    #[case(Some(Some("https://cdn.example.com".to_string())), Site::Explicit("https://cdn.example.com".to_string()))]
    fn test_site(#[case] flag: Flag, #[case] expected: Site) {
        assert_eq!(site(flag), expected);
    }

    #[rstest]
    #[case(&["preload", "fetch", "https://example.com/a.png"], None)]
    #[case(&["preload", "fetch", "--site", "https://example.com/a.png"], Some(None))]
    #[case(&["preload", "fetch", "--site=https://cdn.example.com", "https://example.com/a.png"], Some(Some("https://cdn.example.com".to_string())))]
    fn test_parse_site(#[case] argv: &[&str], #[case] expected: Flag) {
        let args = Args::try_parse_from(argv).unwrap();
        let Commands::Fetch { site, urls, .. } = args.command else {
            panic!("expected the fetch command");
        };
        assert_eq!(site, expected);
        assert_eq!(urls, vec!["https://example.com/a.png".to_string()]);
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "preload",
            "--production",
            "fetch",
            "--name",
            "hero",
            "--ext",
            "webp",
            "--skip-cache",
            "--content-hash",
            "https://example.com/a",
        ])
        .unwrap();
        assert!(args.production);
        let Commands::Fetch { site, name, file_ending, skip_cache, content_hash, .. } = args.command else {
            panic!("expected the fetch command");
        };
        let options = options(site, name, file_ending, skip_cache, content_hash);
        assert_eq!(
            options,
            PreloadOptions::default().with_name("hero").with_file_ending("webp").skip_cache(true).with_cache_key(CacheKey::Content)
        );
    }

    #[test]
    fn test_fetch_requires_urls() {
        assert!(Args::try_parse_from(["preload", "fetch"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["preload", "-v", "-q", "clear"]).is_err());
    }
}
