// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Build-time injection of emitted assets into the template artifact.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{ProjectContext, TEMPLATE_ARTIFACT};
use crate::inject::{module_script_tag, stylesheet_link_tag};
use crate::markers;

/// What the bundler emitted for one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Chunk,
    Asset,
}

/// One entry of the bundle manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleChunk {
    /// Emitted file name, relative to the output directory.
    pub file: String,
    pub kind: ChunkKind,
    #[serde(default)]
    pub is_entry: bool,
    /// Stylesheets imported by this chunk, in import order.
    #[serde(default)]
    pub css: Vec<String>,
}

/// Head markup for the first entry chunk: its imported stylesheets first,
/// then the module script tag. `None` when the manifest has no entry chunk;
/// chunks past the first entry are not considered.
pub fn head_markup(chunks: &[BundleChunk], base: &str) -> Option<String> {
    let entry = chunks
        .iter()
        .find(|c| c.kind == ChunkKind::Chunk && c.is_entry)?;
    let mut markup = String::new();
    for css in &entry.css {
        markup.push_str(&stylesheet_link_tag(&asset_url(base, css)));
    }
    markup.push_str(&module_script_tag(&asset_url(base, &entry.file)));
    Some(markup)
}

fn asset_url(base: &str, file: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{file}")
    } else {
        format!("{base}/{file}")
    }
}

/// Read the bundle manifest, inject the asset tags into the template's
/// wrapped marker region and emit the final artifact into the output
/// directory under the canonical template name.
pub async fn inject_bundle(ctx: &ProjectContext, manifest_path: &Path) -> anyhow::Result<()> {
    let manifest = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("failed to read bundle manifest {}", manifest_path.display()))?;
    let chunks: Vec<BundleChunk> = serde_json::from_str(&manifest)
        .with_context(|| format!("malformed bundle manifest {}", manifest_path.display()))?;

    let Some(markup) = head_markup(&chunks, &ctx.base) else {
        warn!(
            manifest = %manifest_path.display(),
            "no entry chunk in bundle manifest, template not emitted"
        );
        return Ok(());
    };

    let template = tokio::fs::read_to_string(&ctx.template)
        .await
        .with_context(|| format!("failed to read template {}", ctx.template.display()))?;
    let injected = markers::replace_head_comment(&template, &markup, true);

    tokio::fs::create_dir_all(&ctx.out_dir).await?;
    let out_path = ctx.out_dir.join(TEMPLATE_ARTIFACT);
    tokio::fs::write(&out_path, injected)
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!(artifact = %out_path.display(), "template artifact emitted");
    Ok(())
}
