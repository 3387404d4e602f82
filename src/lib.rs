//! Mason Options Library
//!
//! This crate is the command-line front end of the mason build tool: it
//! turns raw process arguments into typed options, an ordered list of
//! commands to run, and the inline `KEY=VALUE` environment overrides, and
//! it assembles the `--help` usage text from registered command
//! documentation.
//!
//! # Key Features
//!
//! - **Typed Option Registry**: options carry a destination key, a tagged
//!   value kind, a default, help text and optional choice sets
//! - **Option Groups**: idempotent, titled buckets used to organize the
//!   help output
//! - **Parallelism Probe**: a layered, failure-swallowing detection of the
//!   default `-j` job count, clamped to `[1, 1024]`
//! - **Usage Composition**: deterministic, column-aligned command tables
//!   built from explicitly registered documentation
//! - **Leftover Classification**: positional tokens split into commands
//!   and environment overrides without losing a token
//!
//! # Examples
//!
//! Parsing an argument vector the way a hosting driver would:
//!
//! ```
//! use mason_options::context::OptionsContext;
//!
//! let mut ctx = OptionsContext::new()?;
//! ctx.register_command_doc("build", "builds the project");
//! let cmdline = ctx.parse_args(["build", "CC=gcc", "-j2"])?;
//! assert_eq!(cmdline.commands, ["build"]);
//! assert_eq!(cmdline.env_overrides, ["CC=gcc"]);
//! assert_eq!(cmdline.options.int_value("jobs")?, 2);
//! # Ok::<(), mason_options::error::Error>(())
//! ```

pub mod classify;
pub mod context;
pub mod error;
pub mod lockfile;
pub mod parallelism;
pub mod registry;
pub mod usage;
