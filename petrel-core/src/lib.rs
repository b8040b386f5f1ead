#![doc = "petrel-core: core pipeline library for petrel."]

//! Markdown parsing, linting, block mapping and multi-destination draft
//! staging. Platform clients and configuration files live in the `petrel`
//! crate; this crate reaches platforms only through [`contract`].
//!
//! # Usage
//! Build a [`platform::PlatformRegistry`], hand it to
//! [`manuscript::ManuscriptService`] and call `stage_draft`.

pub mod blocks;
pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod line_index;
pub mod lint;
pub mod manuscript;
pub mod mapper;
pub mod models;
pub mod native;
pub mod parser;
pub mod platform;
pub mod validate;
