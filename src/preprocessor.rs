//! The directive engine and macro expander.

use crate::builtins;
use crate::config::{Config, Directives};
use crate::cursor::{Cursor, WS_EOL};
use crate::error::PpError;
use crate::macros::{normalize, MacroMap};

/// Directives that can continue or close an open conditional block.
const BLOCK_DIRECTIVES: &[&str] = &["elif", "else", "endif"];

/// Rewrites one top-level source and everything it includes.
///
/// The macro store and the pragma-once guard list are shared down the
/// include chain of a single top-level source; the entry point hands every
/// top-level source its own preprocessor so stores never leak across them.
#[derive(Debug)]
pub(crate) struct Preprocessor<'a> {
    config: &'a Config,
    macros: MacroMap,
    guarded: Vec<String>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(config: &'a Config, macros: MacroMap) -> Preprocessor<'a> {
        Preprocessor {
            config,
            macros,
            guarded: Vec::new(),
        }
    }

    /// Process a top-level source to completion.
    pub fn process(&mut self, name: &str, text: &str) -> Result<String, PpError> {
        self.process_at_depth(name, text, 0)
    }

    // ------------------------------------------------------------------------
    // The per-source engine

    /// Scan one source buffer, executing directives and expanding macros.
    ///
    /// `saw_underscore` is the whole scanner state: it holds exactly when
    /// the previous byte was an underscore that did not itself close a
    /// pair, so `__` triggers the expander and `A_B` never does.
    fn process_at_depth(&mut self, name: &str, text: &str, depth: u32) -> Result<String, PpError> {
        self.macros.bind(builtins::FILE, Some(name.to_owned()));
        self.macros
            .bind(builtins::LINE, Some(builtins::LINE_SENTINEL.to_owned()));

        let mut cur = Cursor::new(name, text, depth);
        let mut saw_underscore = false;
        while let Some(byte) = cur.advance() {
            match byte {
                b'#' => {
                    cur.begin_replace(cur.pos() - 1);
                    self.directive(&mut cur)?;
                    saw_underscore = false;
                }
                b'_' if saw_underscore && self.config.expand_macros => {
                    self.expand(&mut cur)?;
                    saw_underscore = false;
                }
                byte => saw_underscore = byte == b'_',
            }
        }
        Ok(cur.into_buffer())
    }

    // ------------------------------------------------------------------------
    // Directive dispatch

    /// Route a directive keyword to its handler.
    ///
    /// Unknown keywords, and keywords whose enable flag is off, leave the
    /// directive in the buffer untouched.
    fn directive(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let keyword = cur.collect_token(WS_EOL);
        let enabled = self.config.directives;
        match keyword.as_str() {
            "include" if enabled.contains(Directives::INCLUDE) => self.include(cur),
            "if" | "ifdef" | "ifndef" if enabled.contains(Directives::CONDITIONAL) => {
                self.conditional(cur, &keyword)
            }
            "elif" | "else" | "endif" if enabled.contains(Directives::CONDITIONAL) => {
                self.rogue(cur, &keyword)
            }
            "define" if enabled.contains(Directives::DEFINE) => self.define(cur),
            "undef" if enabled.contains(Directives::UNDEF) => self.undef(cur),
            "error" if enabled.contains(Directives::ERROR) => self.user_error(cur),
            "pragma" if enabled.contains(Directives::PRAGMA) => self.pragma(cur),
            _ => Ok(()),
        }
    }

    /// A block-continuation directive outside any open block.
    fn rogue(&mut self, cur: &mut Cursor, keyword: &str) -> Result<(), PpError> {
        if self.config.ignore_unmatched_conditional_directives {
            return Ok(());
        }
        Err(cur.parse_error_at(
            cur.replace_start(),
            format!(
                "#{keyword} directive found without accompanying starting conditional (#if/#ifdef)."
            ),
        ))
    }

    // ------------------------------------------------------------------------
    // #include

    fn include(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let directive_start = cur.replace_start();
        if cur.depth() >= self.config.inclusion_limit {
            return Err(cur.preprocess_error_at(
                directive_start,
                format!(
                    "Inclusions has exceeded the limit of {}.",
                    self.config.inclusion_limit
                ),
            ));
        }

        cur.skip_inline_ws();
        let relative = match cur.advance() {
            Some(b'"') => true,
            Some(b'<') => false,
            _ => return Err(cur.parse_error("Expected \" or <.")),
        };
        let closer = if relative { b'"' } else { b'>' };
        let name = match cur.collect_until_byte(closer) {
            Some(name) => name,
            None => {
                return Err(cur.parse_error("Unexpected end of file while processing directive."))
            }
        };
        cur.end_replace_here();

        let (resolved, text) = match self.resolve_include(cur.name(), &name, relative) {
            Some(found) => found,
            None => {
                return Err(cur.preprocess_error_at(
                    directive_start,
                    format!("Failed to include '{name}': It does not exist."),
                ))
            }
        };

        // A pragma-once guarded source is elided, not re-expanded.
        if self.guarded.iter().any(|seen| *seen == resolved) {
            cur.splice("");
            return Ok(());
        }

        let output = match self.process_at_depth(&resolved, &text, cur.depth() + 1) {
            Ok(output) => output,
            Err(err) => {
                return Err(err.with_note(
                    cur.name(),
                    cur.line_col(directive_start),
                    "included from here",
                ))
            }
        };
        self.macros
            .bind(builtins::FILE, Some(cur.name().to_owned()));
        cur.splice(&output);
        Ok(())
    }

    /// Look an include name up in the configured sources.
    ///
    /// The name is tried verbatim first; the quoted form falls back to a
    /// sibling of the including source.
    fn resolve_include(
        &self,
        current: &str,
        name: &str,
        relative: bool,
    ) -> Option<(String, String)> {
        if let Some(text) = self.config.sources.get(name) {
            return Some((name.to_owned(), text.clone()));
        }
        if relative {
            if let Some(slash) = current.rfind('/') {
                let sibling = format!("{}/{}", &current[..slash], name);
                if let Some(text) = self.config.sources.get(&sibling) {
                    return Some((sibling, text.clone()));
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Conditional blocks

    /// Run the `#if*`/`#elif`/`#else`/`#endif` state machine for one block.
    ///
    /// At most one branch body survives; every directive line of the block
    /// is deleted. The sibling seek is not nesting-aware: conditionals do
    /// not nest within one source, only through includes.
    fn conditional(&mut self, cur: &mut Cursor, first: &str) -> Result<(), PpError> {
        let block_start = cur.replace_start();
        let mut keyword = first.to_owned();
        let mut accepted = false;
        let mut seen_else = false;

        loop {
            let branch_start = cur.replace_start();
            let take = match keyword.as_str() {
                "if" | "ifdef" | "ifndef" | "elif" => {
                    cur.skip_inline_ws();
                    let condition = cur.collect_token(WS_EOL);
                    let truth = self.evaluate(&keyword, &condition);
                    cur.finish_line();
                    truth && !accepted
                }
                "else" => {
                    if seen_else {
                        return Err(cur.parse_error_at(
                            branch_start,
                            "#else directive defined multiple times. Only one #else block is allowed.",
                        ));
                    }
                    seen_else = true;
                    cur.finish_line();
                    !accepted
                }
                _ => {
                    // endif closes the block; rescan the surviving body.
                    cur.finish_line();
                    cur.set_replace(branch_start, cur.pos());
                    cur.splice("");
                    cur.set_pos(block_start);
                    return Ok(());
                }
            };

            if take {
                // Keep the body: only the directive line goes away.
                accepted = true;
                cur.set_replace(branch_start, cur.pos());
                cur.splice("");
                if !cur.seek_directive(BLOCK_DIRECTIVES) {
                    return Err(
                        cur.parse_error("Unexpected end of file while processing directive.")
                    );
                }
            } else {
                // Drop the directive line and the whole branch body.
                if !cur.seek_directive(BLOCK_DIRECTIVES) {
                    return Err(
                        cur.parse_error("Unexpected end of file while processing directive.")
                    );
                }
                let sibling = cur.pos();
                cur.set_replace(branch_start, sibling);
                cur.splice("");
            }

            // The cursor sits at the `#` of the next branch directive.
            cur.begin_replace(cur.pos());
            cur.advance();
            keyword = cur.collect_token(WS_EOL);
        }
    }

    /// Branch truth for a single-identifier condition.
    fn evaluate(&self, keyword: &str, condition: &str) -> bool {
        match keyword {
            "ifdef" => self.macros.contains(condition),
            "ifndef" => !self.macros.contains(condition),
            _ => match self.macros.get(condition) {
                Some(Some(value)) => value != "0" && !value.eq_ignore_ascii_case("false"),
                _ => false,
            },
        }
    }

    // ------------------------------------------------------------------------
    // #define / #undef

    fn define(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let directive_start = cur.replace_start();
        cur.skip_inline_ws();
        let name = cur.collect_token(WS_EOL);
        if name.is_empty() {
            return Err(
                cur.parse_error_at(directive_start, "#define directive is missing name of macro.")
            );
        }
        if builtins::is_builtin(normalize(&name)) {
            return Err(cur.preprocess_error_at(
                directive_start,
                format!("Cannot use macro name '{name}', it is a built-in macro."),
            ));
        }

        let value = if cur.at_eol() {
            None
        } else {
            let raw = cur.collect_token(&[b'\n']);
            let trimmed = raw.trim();
            // One layer of surrounding quotes belongs to the directive, not
            // the value.
            let stripped =
                if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
                    &trimmed[1..trimmed.len() - 1]
                } else {
                    trimmed
                };
            Some(stripped.to_owned())
        };
        self.macros.bind(name, value);

        cur.finish_line();
        cur.end_replace_here();
        cur.splice("");
        Ok(())
    }

    fn undef(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let directive_start = cur.replace_start();
        cur.skip_inline_ws();
        let name = cur.collect_token(WS_EOL);
        if name.is_empty() {
            return Err(
                cur.parse_error_at(directive_start, "#undef directive is missing name of macro.")
            );
        }
        if builtins::is_builtin(normalize(&name)) {
            return Err(cur.preprocess_error_at(
                directive_start,
                format!("Cannot use macro name '{name}', it is a built-in macro."),
            ));
        }
        // Undefining an absent macro is not an error.
        self.macros.remove(&name);

        cur.finish_line();
        cur.end_replace_here();
        cur.splice("");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // #error / #pragma

    /// `#error` is only ever reached from live text, so it always fails
    /// the run with the quoted message.
    fn user_error(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let message = match cur.collect_until_byte(b'"') {
            Some(_) => cur.collect_token(&[b'"', b'\n']),
            None => String::new(),
        };
        Err(cur.preprocess_error_at(cur.pos(), message))
    }

    fn pragma(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let directive_start = cur.replace_start();
        cur.skip_inline_ws();
        let extension = cur.collect_token(WS_EOL);
        if extension != "once" {
            return Err(cur.preprocess_error_at(
                directive_start,
                format!("Pragma extension '{extension}' is unsupported."),
            ));
        }

        let name = cur.name().to_owned();
        if !self.guarded.contains(&name) {
            self.guarded.push(name);
        }

        cur.finish_line();
        cur.end_replace_here();
        cur.splice("");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Macro expansion

    /// Expand a `__NAME__` reference; the two opening underscores have
    /// already been consumed by the scanner.
    fn expand(&mut self, cur: &mut Cursor) -> Result<(), PpError> {
        let macro_start = cur.pos() - 2;
        let name = match cur.collect_until_str("__") {
            Some(name) => name,
            None => {
                return Err(cur
                    .parse_error_at(macro_start, "Unexpected end of file while processing directive."))
            }
        };

        let value = if name == builtins::LINE {
            // The stored slot only satisfies existence checks; the real
            // value is the line the reference sits on.
            cur.line_col(macro_start).line.to_string()
        } else {
            match self.macros.get(&name) {
                Some(value) => value.clone().unwrap_or_default(),
                None => {
                    return Err(cur.parse_error_at(
                        macro_start,
                        format!("Cannot expand macro __{name}__, it is undefined."),
                    ))
                }
            }
        };

        cur.set_replace(macro_start, cur.pos());
        cur.splice(&value);
        Ok(())
    }
}
