// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Development-time bridge between a frontend single-page app and a remotely
//! hosted Blogger blog.
//!
//! This library provides the rewriting proxy used by the `dev` and `preview`
//! commands and the build-time template injector; `main.rs` remains the
//! binary entrypoint.

pub mod build;
pub mod classify;
pub mod config;
pub mod headers;
pub mod inject;
pub mod markers;
pub mod proxy;
pub mod redirect;
pub mod rewrite;
pub mod view;
