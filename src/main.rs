// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use blogger_bridge::{build, config, proxy, view::ServeMode};

#[derive(Parser, Debug)]
#[command(name = "blogger-bridge")]
struct Args {
    /// Project root directory
    #[arg(long, default_value = ".")]
    root: String,

    /// Options TOML path, relative to the project root
    #[arg(long, default_value = "blogger-bridge.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Proxy the live blog, injecting the entry module as a dev script tag
    Dev {
        /// Listen address, e.g. 127.0.0.1:3000
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: String,
    },
    /// Proxy the live blog, reinjecting the asset tags baked into the built template
    Preview {
        /// Listen address, e.g. 127.0.0.1:4173
        #[arg(long, default_value = "127.0.0.1:4173")]
        listen: String,

        /// Build output directory holding the emitted template
        #[arg(long, default_value = "dist")]
        out_dir: String,
    },
    /// Inject built asset tags into the template and emit the final artifact
    Build {
        /// Build output directory
        #[arg(long, default_value = "dist")]
        out_dir: String,

        /// Public base path prefixed onto asset URLs
        #[arg(long, default_value = "/")]
        base: String,

        /// Bundle manifest path, defaults to <out-dir>/manifest.json
        #[arg(long)]
        manifest: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let root = PathBuf::from(&args.root)
        .canonicalize()
        .with_context(|| format!("project root not found: {}", args.root))?;
    let options = config::Options::load_from_path(root.join(&args.config)).await?;

    match args.command {
        Command::Dev { listen } => {
            let addr: SocketAddr = listen.parse()?;
            let ctx = config::ProjectContext::resolve(
                root.clone(),
                root.join("dist"),
                "/".into(),
                options,
            )
            .await?;
            serve(addr, Arc::new(ctx), ServeMode::Dev).await
        }
        Command::Preview { listen, out_dir } => {
            let addr: SocketAddr = listen.parse()?;
            let ctx = config::ProjectContext::resolve(
                root.clone(),
                root.join(out_dir),
                "/".into(),
                options,
            )
            .await?;
            serve(addr, Arc::new(ctx), ServeMode::Preview).await
        }
        Command::Build {
            out_dir,
            base,
            manifest,
        } => {
            let out_dir = root.join(out_dir);
            let manifest_path = manifest
                .map(|m| root.join(m))
                .unwrap_or_else(|| out_dir.join("manifest.json"));
            let ctx = config::ProjectContext::resolve(root, out_dir, base, options).await?;
            build::inject_bundle(&ctx, &manifest_path).await
        }
    }
}

async fn serve(
    addr: SocketAddr,
    ctx: Arc<config::ProjectContext>,
    mode: ServeMode,
) -> anyhow::Result<()> {
    let server = proxy::run_server(addr, ctx, mode, None);

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                error!(%e, "server error");
            }
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}
