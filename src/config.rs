//! Build configuration for a processing run.

use ahash::RandomState;
use bitflags::bitflags;
use indexmap::IndexMap;
use serde::Deserialize;

/// An ordered map from source name to source text.
///
/// Iteration order is insertion order, so the processing result lists
/// sources in the order the caller provided them.
pub type SourceMap = IndexMap<String, String, RandomState>;

/// An ordered map from macro name to its optional value.
pub type MacroDefs = IndexMap<String, Option<String>, RandomState>;

bitflags! {
    /// The set of directive kinds the engine is allowed to execute.
    ///
    /// A directive whose flag is absent is treated like an unknown keyword
    /// and left in the text untouched.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Directives: u8 {
        const INCLUDE = 1 << 0;
        const CONDITIONAL = 1 << 1;
        const DEFINE = 1 << 2;
        const UNDEF = 1 << 3;
        const ERROR = 1 << 4;
        const PRAGMA = 1 << 5;
    }
}

impl Default for Directives {
    fn default() -> Directives {
        Directives::all()
    }
}

/// Immutable configuration for one processing run.
#[derive(Debug, Clone)]
pub struct Config {
    /// The universe of sources available for inclusion.
    pub sources: SourceMap,
    /// The subset of sources actually emitted in the result. Empty means
    /// every entry of `sources` is emitted.
    pub main_sources: SourceMap,
    /// User predefined macros, seeded before the built-ins.
    pub macros: MacroDefs,
    /// Maximum nested `#include` depth.
    pub inclusion_limit: u32,
    /// Leave rogue `#elif`/`#else`/`#endif` directives in the text instead
    /// of failing.
    pub ignore_unmatched_conditional_directives: bool,
    /// Which directive kinds to execute.
    pub directives: Directives,
    /// Whether `__NAME__` references are expanded.
    pub expand_macros: bool,
}

pub const DEFAULT_INCLUSION_LIMIT: u32 = 4000;

impl Default for Config {
    fn default() -> Config {
        Config {
            sources: SourceMap::default(),
            main_sources: SourceMap::default(),
            macros: MacroDefs::default(),
            inclusion_limit: DEFAULT_INCLUSION_LIMIT,
            ignore_unmatched_conditional_directives: false,
            directives: Directives::all(),
            expand_macros: true,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Execute no directives at all. Macro expansion is unaffected.
    pub fn disable_all_directives(&mut self) {
        self.directives = Directives::empty();
    }

    /// Execute every directive kind.
    pub fn enable_all_directives(&mut self) {
        self.directives = Directives::all();
    }

    /// Read a `Config` from a TOML document.
    ///
    /// The core performs no I/O; hosts load the document themselves. Macro
    /// values in TOML are always strings; value-less predefines can only be
    /// created through [`Config::macros`] directly.
    pub fn from_toml_str(text: &str) -> Result<Config, toml::de::Error> {
        Ok(toml::from_str::<ConfigFile>(text)?.into())
    }
}

// ----------------------------------------------------------------------------
// TOML representation

/// Struct for deserializing a config from TOML.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
struct ConfigFile {
    sources: SourceMap,
    main_sources: SourceMap,
    macros: IndexMap<String, String, RandomState>,
    inclusion_limit: Option<u32>,
    ignore_unmatched_conditional_directives: bool,
    directives: DirectiveFile,
    expand_macros: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
struct DirectiveFile {
    include: bool,
    conditional: bool,
    define: bool,
    undef: bool,
    error: bool,
    pragma: bool,
}

impl Default for DirectiveFile {
    fn default() -> DirectiveFile {
        DirectiveFile {
            include: true,
            conditional: true,
            define: true,
            undef: true,
            error: true,
            pragma: true,
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Config {
        let mut directives = Directives::empty();
        directives.set(Directives::INCLUDE, file.directives.include);
        directives.set(Directives::CONDITIONAL, file.directives.conditional);
        directives.set(Directives::DEFINE, file.directives.define);
        directives.set(Directives::UNDEF, file.directives.undef);
        directives.set(Directives::ERROR, file.directives.error);
        directives.set(Directives::PRAGMA, file.directives.pragma);

        Config {
            sources: file.sources,
            main_sources: file.main_sources,
            macros: file
                .macros
                .into_iter()
                .map(|(name, value)| (name, Some(value)))
                .collect(),
            inclusion_limit: file.inclusion_limit.unwrap_or(DEFAULT_INCLUSION_LIMIT),
            ignore_unmatched_conditional_directives: file
                .ignore_unmatched_conditional_directives,
            directives,
            expand_macros: file.expand_macros.unwrap_or(true),
        }
    }
}
