//! Build-scope configuration.
//!
//! A [`BuildConfig`] is assembled once per build from three layers, later
//! layers overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`preload.toml` in the working directory, or an explicit
//!    path),
//! 3. environment variables prefixed with `PRELOAD_` (`PRELOAD_MODE`,
//!    `PRELOAD_SITE`, `PRELOAD_BASE`, `PRELOAD_PUBLIC_DIR`, ...).
//!
//! The result is validated and then treated as immutable for the rest of the
//! build.
//!
//! ```toml
//! public_dir = "public"
//! out_dir = "dist"
//! base = "/docs/"
//! site = "https://example.com"
//! mode = "production"
//! clear_preloaded = true
//! ```

pub mod error;
mod mode;

pub use crate::mode::Mode;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory when no explicit
/// path is given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "preload.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "PRELOAD_";
/// Location of the preload store, relative to both the public directory and
/// the served site root.
pub const PRELOAD_SEGMENT: &str = "assets/preloaded";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory whose contents are served verbatim; the preload store lives
    /// inside it.
    pub public_dir: PathBuf,
    /// Build output directory.
    pub out_dir: PathBuf,
    /// URL path prefix for everything served by the site. May be empty, and
    /// may or may not carry leading/trailing slashes.
    pub base: String,
    /// Default external origin, e.g. `https://example.com`.
    pub site: Option<String>,
    pub mode: Mode,
    /// Empty the preload store before a build.
    pub clear_preloaded: bool,
}
impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            out_dir: PathBuf::from("dist"),
            base: "/".to_string(),
            site: None,
            mode: Mode::default(),
            clear_preloaded: false,
        }
    }
}
impl BuildConfig {
    /// Load, merge and validate the configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path
            && !path.is_file()
        {
            exn::bail!(ErrorKind::Missing(path.to_path_buf()));
        }
        let config: Self = Self::figment(path).extract().or_raise(|| ErrorKind::Load)?;
        let config = config.validated()?;
        tracing::debug!(
            public_dir = %config.public_dir.display(),
            base = %config.base,
            site = config.site.as_deref().unwrap_or(""),
            mode = %config.mode,
            "Loaded build configuration"
        );
        Ok(config)
    }

    /// The layered provider, before extraction.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(file)).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Check values and normalize them into their canonical form: directories
    /// become absolute (without touching the filesystem) and a blank site is
    /// treated as no site at all.
    pub fn validated(mut self) -> Result<Self> {
        if self.public_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("`public_dir` must not be empty".to_string()));
        }
        if self.out_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("`out_dir` must not be empty".to_string()));
        }
        self.public_dir = std::path::absolute(&self.public_dir)
            .or_raise(|| ErrorKind::Invalid(format!("cannot resolve `{}`", self.public_dir.display())))?;
        self.out_dir = std::path::absolute(&self.out_dir)
            .or_raise(|| ErrorKind::Invalid(format!("cannot resolve `{}`", self.out_dir.display())))?;
        self.site = self.site.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.base = self.base.trim().to_string();
        Ok(self)
    }

    /// `{public_dir}/assets/preloaded`
    pub fn preload_dir(&self) -> PathBuf {
        self.public_dir.join(PRELOAD_SEGMENT)
    }

    /// `{out_dir}/assets/preloaded`
    pub fn output_preload_dir(&self) -> PathBuf {
        self.out_dir.join(PRELOAD_SEGMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = BuildConfig::load(None).unwrap();
            assert_eq!(config.mode, Mode::Development);
            assert_eq!(config.base, "/");
            assert_eq!(config.site, None);
            assert!(config.public_dir.is_absolute());
            assert!(config.preload_dir().ends_with("public/assets/preloaded"));
            assert!(config.output_preload_dir().ends_with("dist/assets/preloaded"));
            assert!(!config.clear_preloaded);
            Ok(())
        });
    }

    #[test]
    fn test_default_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                public_dir = "static"
                base = "/docs/"
                site = "https://example.com"
                mode = "production"
                clear_preloaded = true
                "#,
            )?;
            let config = BuildConfig::load(None).unwrap();
            assert!(config.public_dir.is_absolute() && config.public_dir.ends_with("static"));
            assert_eq!(config.base, "/docs/");
            assert_eq!(config.site.as_deref(), Some("https://example.com"));
            assert!(config.mode.is_production());
            assert!(config.clear_preloaded);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", r#"mode = "development""#)?;
            jail.set_env("PRELOAD_MODE", "prod");
            jail.set_env("PRELOAD_SITE", "https://cdn.example.com");
            let config = BuildConfig::load(Some(Path::new("custom.toml"))).unwrap();
            assert_eq!(config.mode, Mode::Production);
            assert_eq!(config.site.as_deref(), Some("https://cdn.example.com"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|_jail| {
            let err = BuildConfig::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Missing(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_mode() {
        Jail::expect_with(|jail| {
            jail.set_env("PRELOAD_MODE", "staging");
            let err = BuildConfig::load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load));
            Ok(())
        });
    }

    #[test]
    fn test_blank_site_is_none() {
        let config = BuildConfig { site: Some("  ".to_string()), ..Default::default() }.validated().unwrap();
        assert_eq!(config.site, None);
    }

    #[test]
    fn test_empty_public_dir_rejected() {
        let err = BuildConfig { public_dir: PathBuf::new(), ..Default::default() }.validated().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
