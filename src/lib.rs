//! Declarative symlink manager with conditional rules and redirects.
//!
//! rstow resolves an ordered rule language (`.stowconfig` files: ignores,
//! un-ignores, redirects, and conditional blocks guarded by package/profile
//! predicates) over a source directory tree, reconciles the resulting plan
//! against live target-filesystem state, and applies the non-conflicting
//! symlinks.
//!
//! The crate is organised along the data flow:
//!
//! - **[`config`]** — parse `.stowconfig` files into an order-preserving
//!   rule set
//! - **[`resolve`]** — predicate evaluation, path matching, and per-path
//!   rule resolution
//! - **[`plan`]** — walk the source tree into an ordered link plan
//! - **[`reconcile`]** — classify each planned link against target state
//!   under the overwrite policy
//! - **[`apply`]** — execute the plan (create parents, create symlinks)
//! - **[`commands`]** — top-level orchestration for linking and `status`
//!
//! Runtime collaborators (package oracle, confirmation prompt, logging,
//! platform queries) live in [`exec`], [`prompt`], [`logging`], and
//! [`platform`] behind small traits so resolution stays pure and testable.
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod platform;
pub mod prompt;
pub mod reconcile;
pub mod resolve;
pub mod resources;
