//! Loader for mirror configuration with YAML + environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, the YAML file(s),
//! `DOCMIRROR_`-prefixed environment variables (nested keys joined with `__`,
//! e.g. `DOCMIRROR_OUTPUT__DIR=mirror`), then explicit overrides (CLI flags).
//! String values may reference other environment variables as `${VAR}`.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "DOCMIRROR";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The documentation site being mirrored.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_root_url")]
    pub root_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
        }
    }
}

/// Where and how mirrored files are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output root; articles land in `<dir>/<docs_dir>/`.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    /// File name of the JSON index inside the docs directory.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_readme")]
    pub readme: PathBuf,
    /// Prefix prepended to article paths when linking from the README.
    #[serde(default = "default_readme_link_prefix")]
    pub readme_link_prefix: String,
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            docs_dir: default_docs_dir(),
            index_file: default_index_file(),
            readme: default_readme(),
            readme_link_prefix: default_readme_link_prefix(),
            stylesheet: default_stylesheet(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Language tag every code block is normalised to.
    #[serde(default = "default_code_language")]
    pub code_language: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            code_language: default_code_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout; `null` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
    /// Retries for 429/5xx/transport failures. Zero keeps every failure terminal.
    #[serde(default)]
    pub retries: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: 0,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatKind {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormatKind,
    /// Also write a daily rolling log file.
    #[serde(default)]
    pub file: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormatKind::Text,
            file: false,
            dir: None,
        }
    }
}

fn default_root_url() -> String {
    "https://www.jsdoc.com.cn".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}
fn default_docs_dir() -> String {
    "docs".into()
}
fn default_index_file() -> String {
    "indexes.json".into()
}
fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}
fn default_readme_link_prefix() -> String {
    "dist/".into()
}
fn default_stylesheet() -> String {
    "../doc.css".into()
}
fn default_lang() -> String {
    "zh_CN".into()
}
fn default_code_language() -> String {
    "js".into()
}
fn default_timeout_secs() -> Option<u64> {
    Some(30)
}
fn default_log_level() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct MirrorConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    overrides: Vec<(String, config::Value)>,
}

impl Default for MirrorConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorConfigLoader {
    /// Start from built-in defaults; env overrides are layered on in [`load`](Self::load).
    ///
    /// ```
    /// use docmirror_config::MirrorConfigLoader;
    ///
    /// let config = MirrorConfigLoader::new()
    ///     .with_yaml_str("site:\n  root_url: https://docs.example.com")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.site.root_url, "https://docs.example.com");
    /// assert_eq!(config.output.docs_dir, "docs");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            overrides: Vec::new(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Force a dotted key (e.g. `output.dir`) regardless of file or env.
    ///
    /// ```
    /// use docmirror_config::MirrorConfigLoader;
    ///
    /// let config = MirrorConfigLoader::new()
    ///     .with_yaml_str("http:\n  retries: 1")
    ///     .with_override("http.retries", 3)
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.http.retries, 3);
    /// ```
    pub fn with_override<V: Into<config::Value>>(mut self, key: &str, value: V) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `${VAR}` placeholders are expanded after merging and before the typed
    /// structs are materialised.
    pub fn load(self) -> Result<MirrorConfig, ConfigError> {
        let mut builder = self.builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        for (key, value) in self.overrides {
            builder = builder.set_override(key, value)?;
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("MIRROR_HOST", Some("docs.example.com"), || {
            let mut v = json!("https://${MIRROR_HOST}/");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("https://docs.example.com/"));
        });
    }

    #[test]
    fn expands_nested_values_recursively() {
        temp_env::with_vars(
            [
                ("MIRROR_ROOT", Some("/srv/${MIRROR_SUB}")),
                ("MIRROR_SUB", Some("mirror")),
            ],
            || {
                let mut v = json!({ "output": { "dir": "${MIRROR_ROOT}/dist" }, "n": [1, "$MIRROR_SUB"] });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({ "output": { "dir": "/srv/mirror/dist" }, "n": [1, "mirror"] })
                );
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("CYC_A", Some("${CYC_B}")), ("CYC_B", Some("${CYC_A}"))], || {
            let mut v = json!("x=${CYC_A}");
            expand_env_in_value(&mut v);
            assert!(v.as_str().unwrap().contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOCMIRROR_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOCMIRROR_DOES_NOT_EXIST}"));
    }

    #[test]
    #[serial_test::serial]
    fn empty_sources_yield_defaults() {
        let cfg = MirrorConfigLoader::new().load().unwrap();
        assert_eq!(cfg.site.root_url, "https://www.jsdoc.com.cn");
        assert_eq!(cfg.output.dir, PathBuf::from("dist"));
        assert_eq!(cfg.output.index_file, "indexes.json");
        assert_eq!(cfg.extract.code_language, "js");
        assert_eq!(cfg.http.retries, 0);
        assert_eq!(cfg.http.timeout_secs, Some(30));
        assert_eq!(cfg.logging.format, LogFormatKind::Text);
    }
}
