// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! User options and project context resolution.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

/// User-supplied options. The schema is strict: unknown keys fail loading.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Frontend entry module, relative to the project root.
    pub entry: Option<String>,
    /// Blogger template source, relative to the project root.
    pub template: Option<String>,
    /// Absolute URL of the live blog used as the proxied origin.
    pub proxy_blog: String,
}

impl Options {
    /// Load options from a TOML file.
    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let s = tokio::fs::read_to_string(path_ref)
            .await
            .with_context(|| format!("failed to read options from {}", path_ref.display()))?;
        let options: Self = toml::from_str(&s)
            .with_context(|| format!("invalid options in {}", path_ref.display()))?;
        Ok(options)
    }
}

/// Entry candidates tried, in order, when `entry` is not configured.
const ENTRY_CANDIDATES: &[&str] = &[
    "src/index.tsx",
    "src/index.ts",
    "src/index.jsx",
    "src/index.js",
    "src/main.tsx",
    "src/main.ts",
    "src/main.jsx",
    "src/main.js",
];

/// Template candidates tried, in order, when `template` is not configured.
const TEMPLATE_CANDIDATES: &[&str] = &["src/template.xml", "src/theme.xml"];

/// Canonical file name of the emitted template artifact.
pub const TEMPLATE_ARTIFACT: &str = "template.xml";

/// Resolved per-session context. Built once at startup, read-only afterwards
/// and shared across request handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    /// Public base path prefixed onto emitted asset URLs.
    pub base: String,
    /// Absolute path of the frontend entry module.
    pub entry: PathBuf,
    /// Absolute path of the template source.
    pub template: PathBuf,
    /// Parsed proxied origin.
    pub origin: Url,
    pub options: Options,
}

impl ProjectContext {
    pub async fn resolve(
        root: PathBuf,
        out_dir: PathBuf,
        base: String,
        options: Options,
    ) -> anyhow::Result<Self> {
        let origin = Url::parse(&options.proxy_blog)
            .with_context(|| format!("proxy_blog is not an absolute URL: {}", options.proxy_blog))?;
        if !matches!(origin.scheme(), "http" | "https") {
            bail!("proxy_blog must be an http or https URL, got {origin}");
        }
        let entry = resolve_file(&root, options.entry.as_deref(), ENTRY_CANDIDATES, "entry").await?;
        let template = resolve_file(
            &root,
            options.template.as_deref(),
            TEMPLATE_CANDIDATES,
            "template",
        )
        .await?;
        Ok(Self {
            root,
            out_dir,
            base,
            entry,
            template,
            origin,
            options,
        })
    }

    /// Entry path relative to the project root, with URL-style separators.
    pub fn entry_rel(&self) -> String {
        let rel = self.entry.strip_prefix(&self.root).unwrap_or(&self.entry);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Authority (`host[:port]`) of the proxied origin.
    pub fn origin_host(&self) -> String {
        let host = self.origin.host_str().unwrap_or_default();
        match self.origin.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

async fn resolve_file(
    root: &Path,
    explicit: Option<&str>,
    candidates: &[&str],
    what: &str,
) -> anyhow::Result<PathBuf> {
    if let Some(rel) = explicit {
        let path = root.join(rel);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }
        bail!("configured {what} file not found: {}", path.display());
    }
    for rel in candidates {
        let path = root.join(rel);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }
    }
    bail!("no {what} file found; tried {}", candidates.join(", "));
}
