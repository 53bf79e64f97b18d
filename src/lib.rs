//! An in-memory, language-agnostic preprocessor in the C style.
//!
//! Callers hand [`process`] a [`Config`] holding named textual sources and
//! get back the same sources with directive lines (`#include`, `#if` and
//! its chain, `#define`, `#undef`, `#error`, `#pragma once`) executed and
//! `__NAME__` macro references expanded. There is no filesystem or network
//! I/O in the core; inclusion resolves against the configured source map.
#![forbid(unsafe_code)]

mod error;
pub use error::*;

// roughly in order of stage
pub mod config;
pub use config::{Config, Directives, MacroDefs, SourceMap};

mod builtins;
mod cursor;
mod macros;
mod preprocessor;

use builtins::Timestamps;
use macros::MacroMap;
use preprocessor::Preprocessor;

/// The result of a processing run.
#[derive(Debug, Clone)]
pub struct Output {
    /// The rewritten sources: exactly the main sources when a main set was
    /// configured, all sources otherwise.
    pub sources: SourceMap,
    /// The string `__DATE__` expanded to during this run.
    pub date: String,
    /// The string `__TIME__` expanded to during this run.
    pub time: String,
    /// The string `__TIMESTAMP__` expanded to during this run.
    pub timestamp: String,
}

/// Run the preprocessor over every main source of the configuration.
///
/// Each top-level source starts from the same seeded macro store (user
/// predefines overlaid with the built-ins); mutations made by `#define` and
/// `#undef` are visible across the include chain of one top-level source
/// and never across top-level sources. The first error aborts the run.
pub fn process(config: &Config) -> Result<Output, PpError> {
    let stamp = Timestamps::now();
    let mut seed = MacroMap::default();
    for (name, value) in config.macros.iter() {
        seed.bind(name.clone(), value.clone());
    }
    builtins::install(&mut seed, &stamp);

    let selected = if config.main_sources.is_empty() {
        &config.sources
    } else {
        &config.main_sources
    };

    let mut sources = SourceMap::default();
    for (name, text) in selected.iter() {
        let mut preprocessor = Preprocessor::new(config, seed.clone());
        sources.insert(name.clone(), preprocessor.process(name, text)?);
    }

    Ok(Output {
        sources,
        date: stamp.date,
        time: stamp.time,
        timestamp: stamp.timestamp,
    })
}
