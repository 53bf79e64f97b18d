//! Error and diagnostics handling.

use std::{error, fmt, io};

use termcolor::{Color, ColorSpec, WriteColor};

// ----------------------------------------------------------------------------
// Location handling

/// Line and column information for a diagnostic, 0-origin.
///
/// Both fields are byte-oriented offsets computed from the buffer prefix up
/// to the offending position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct Location {
    /// The line number, starting at 0.
    pub line: u32,
    /// The column number, starting at 0.
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

// ----------------------------------------------------------------------------
// Error handling

/// The two failure categories the engine distinguishes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Category {
    /// A runtime failure: missing include, inclusion limit, `#error` fired,
    /// unsupported pragma, redefinition of a built-in.
    #[default]
    Preprocess,
    /// A structural failure: malformed directive arguments, undefined macro
    /// expansion, unmatched or duplicated conditional directives.
    Parse,
}

impl Category {
    fn tag(self) -> &'static str {
        match self {
            Category::Preprocess => "error",
            Category::Parse => "parse error",
        }
    }

    fn style(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Category::Preprocess => {
                spec.set_fg(Some(Color::Red));
            }
            Category::Parse => {
                spec.set_fg(Some(Color::Red)).set_intense(true);
            }
        }
        spec
    }
}

/// An error produced while processing a source, with location information.
///
/// Any error aborts the run that raised it; there is no local recovery.
#[derive(Debug, Clone, Eq, PartialEq)]
#[must_use]
pub struct PpError {
    source_name: String,
    location: Location,
    category: Category,
    description: String,
    notes: Vec<DiagnosticNote>,
}

/// An additional note attached to an error, at some other location.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiagnosticNote {
    source_name: String,
    location: Location,
    description: String,
}

impl PpError {
    pub fn new<N: Into<String>, D: Into<String>>(
        source_name: N,
        location: Location,
        category: Category,
        description: D,
    ) -> PpError {
        PpError {
            source_name: source_name.into(),
            location,
            category,
            description: description.into(),
            notes: Vec::new(),
        }
    }

    pub fn add_note<N: Into<String>, D: Into<String>>(
        &mut self,
        source_name: N,
        location: Location,
        description: D,
    ) {
        self.notes.push(DiagnosticNote {
            source_name: source_name.into(),
            location,
            description: description.into(),
        });
    }

    pub fn with_note<N: Into<String>, D: Into<String>>(
        mut self,
        source_name: N,
        location: Location,
        description: D,
    ) -> PpError {
        self.add_note(source_name, location, description);
        self
    }

    /// Get the name of the source in which this error was observed.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Get the location in the source at which this error was observed.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Get the category of this error.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Get the description associated with this error.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the additional notes associated with this error.
    pub fn notes(&self) -> &[DiagnosticNote] {
        &self.notes
    }
}

impl fmt::Display for PpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error processing {}{}: ", self.source_name, self.location)?;
        if let Category::Parse = self.category {
            f.write_str("Parse error: ")?;
        }
        f.write_str(&self.description)?;
        for note in self.notes.iter() {
            write!(
                f,
                "\n- {}{}: {}",
                note.source_name, note.location, note.description
            )?;
        }
        Ok(())
    }
}

impl error::Error for PpError {}

impl DiagnosticNote {
    /// Get the name of the source this note points into.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Get the location this note points at.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Get the description associated with this note.
    pub fn description(&self) -> &str {
        &self.description
    }
}

// ----------------------------------------------------------------------------
// Pretty printing

/// Pretty-print a `PpError` to the given output.
pub fn pretty_print_error<W: WriteColor>(w: &mut W, error: &PpError) -> io::Result<()> {
    writeln!(
        w,
        "{}, line {}, column {}:",
        error.source_name(),
        error.location().line,
        error.location().column,
    )?;

    w.set_color(&error.category().style())?;
    write!(w, "{}", error.category().tag())?;
    w.reset()?;
    writeln!(w, ": {}", error.description())?;

    for note in error.notes().iter() {
        if note.source_name() == error.source_name() {
            writeln!(
                w,
                "- {}:{}: {}",
                note.location().line,
                note.location().column,
                note.description(),
            )?;
        } else {
            writeln!(
                w,
                "- {}:{}:{}: {}",
                note.source_name(),
                note.location().line,
                note.location().column,
                note.description(),
            )?;
        }
    }
    writeln!(w)
}

/// Pretty-print a `PpError` without color escapes.
pub fn pretty_print_error_nocolor<W: io::Write>(w: &mut W, error: &PpError) -> io::Result<()> {
    pretty_print_error(&mut termcolor::NoColor::new(w), error)
}
