// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional; the defaults reproduce the stock project
/// layout:
///
/// ```toml
/// [project]
/// dev_dir = "dev"
/// build_dir = "build"
/// online = true
///
/// [preprocessors]
/// styles = "scss"
/// template = "pug"
///
/// [watch]
/// files = ["txt", "json", "md", "woff2"]
/// images = ["jpg", "jpeg", "png", "webp", "svg"]
///
/// [deploy]
/// hostname = "login@yousite.com"
/// destination = "yousite/public_html/"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Base directories and the online flag from `[project]`.
    #[serde(default)]
    pub project: ProjectSection,

    /// Preprocessor choices from `[preprocessors]`.
    #[serde(default)]
    pub preprocessors: PreprocessorsSection,

    /// Watched extension lists from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// Optional per-asset-group src/dest overrides from `[paths.<group>]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Deploy target from `[deploy]`.
    #[serde(default)]
    pub deploy: DeploySection,

    /// Live-reload server settings from `[server]`.
    #[serde(default)]
    pub server: ServerSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Source tree root, without a trailing slash.
    #[serde(default = "default_dev_dir")]
    pub dev_dir: String,

    /// Build output root, without a trailing slash.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// If false, the live-reload server binds to loopback only.
    #[serde(default = "default_online")]
    pub online: bool,
}

fn default_dev_dir() -> String {
    "dev".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_online() -> bool {
    true
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            dev_dir: default_dev_dir(),
            build_dir: default_build_dir(),
            online: default_online(),
        }
    }
}

/// Supported style preprocessors. A closed set resolved at load time;
/// there is deliberately no plugin mechanism behind this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StylePreprocessor {
    #[default]
    Scss,
    Sass,
}

impl StylePreprocessor {
    /// File extension (and conventional directory name) for this syntax.
    pub fn extension(self) -> &'static str {
        match self {
            StylePreprocessor::Scss => "scss",
            StylePreprocessor::Sass => "sass",
        }
    }
}

/// Supported template preprocessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplatePreprocessor {
    #[default]
    Pug,
    /// Plain HTML input: the compile step is a pass-through and only the
    /// validator and minifier run.
    Html,
}

impl TemplatePreprocessor {
    pub fn extension(self) -> &'static str {
        match self {
            TemplatePreprocessor::Pug => "pug",
            TemplatePreprocessor::Html => "html",
        }
    }
}

/// `[preprocessors]` section.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PreprocessorsSection {
    #[serde(default)]
    pub styles: StylePreprocessor,

    #[serde(default)]
    pub template: TemplatePreprocessor,
}

/// `[watch]` section: extension lists, lowercase, without dots.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Extensions in the build tree that trigger a hard reload without
    /// re-running any pipeline.
    #[serde(default = "default_files_watch")]
    pub files: Vec<String>,

    /// Image extensions watched under the dev images directory.
    #[serde(default = "default_images_watch")]
    pub images: Vec<String>,
}

fn default_files_watch() -> Vec<String> {
    ["txt", "json", "md", "woff2"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_images_watch() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            files: default_files_watch(),
            images: default_images_watch(),
        }
    }
}

/// `[paths.<group>]` override for one asset group.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PathOverride {
    /// Source glob(s), relative to the working directory.
    #[serde(default)]
    pub src: Option<Vec<String>>,

    /// Destination directory.
    #[serde(default)]
    pub dest: Option<String>,
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PathsSection {
    #[serde(default)]
    pub scripts: PathOverride,
    #[serde(default)]
    pub styles: PathOverride,
    #[serde(default)]
    pub template: PathOverride,
    #[serde(default)]
    pub images: PathOverride,
}

/// `[deploy]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploySection {
    /// Remote login target, e.g. `login@yousite.com`. Empty means "deploy
    /// not configured"; the deploy task refuses to run in that case.
    #[serde(default)]
    pub hostname: String,

    /// Remote path, e.g. `yousite/public_html/`.
    #[serde(default)]
    pub destination: String,

    /// Extra patterns to force-include.
    #[serde(default)]
    pub include: Vec<String>,

    /// Patterns excluded from the transfer.
    #[serde(default = "default_deploy_exclude")]
    pub exclude: Vec<String>,
}

fn default_deploy_exclude() -> Vec<String> {
    vec!["**/Thumbs.db".to_string(), "**/*.DS_Store".to_string()]
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            destination: String::new(),
            include: Vec::new(),
            exclude: default_deploy_exclude(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Source globs and destination directory for one asset group.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub src: Vec<String>,
    pub dest: PathBuf,
}

/// The immutable path configuration record: every asset group's concrete
/// source globs and destination directory, derived once at startup from
/// the base dirs, the chosen preprocessors and any `[paths]` overrides.
///
/// Passed by shared reference into every task; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub dev_dir: PathBuf,
    pub build_dir: PathBuf,
    pub scripts: AssetPaths,
    pub styles: AssetPaths,
    pub template: AssetPaths,
    pub images: AssetPaths,
}

impl ResolvedPaths {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let dev = &cfg.project.dev_dir;
        let build = &cfg.project.build_dir;
        let css_ext = cfg.preprocessors.styles.extension();
        let html_ext = cfg.preprocessors.template.extension();

        let scripts = resolve_group(
            &cfg.paths.scripts,
            vec![format!("{dev}/assets/js/app.js")],
            format!("{build}/js"),
        );
        let styles = resolve_group(
            &cfg.paths.styles,
            vec![format!("{dev}/assets/{css_ext}/style.{css_ext}")],
            format!("{build}/css"),
        );
        let template = resolve_group(
            &cfg.paths.template,
            vec![format!("{dev}/assets/{html_ext}/index.{html_ext}")],
            build.clone(),
        );
        let images = resolve_group(
            &cfg.paths.images,
            vec![format!("{dev}/assets/images/**/*")],
            format!("{build}/images"),
        );

        Self {
            dev_dir: PathBuf::from(dev),
            build_dir: PathBuf::from(build),
            scripts,
            styles,
            template,
            images,
        }
    }
}

fn resolve_group(
    over: &PathOverride,
    default_src: Vec<String>,
    default_dest: String,
) -> AssetPaths {
    AssetPaths {
        src: over.src.clone().unwrap_or(default_src),
        dest: PathBuf::from(over.dest.clone().unwrap_or(default_dest)),
    }
}
