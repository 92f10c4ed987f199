//! Plain-text report for terminals.
//!
//! ```text
//! Algorithm: SHA-256
//!
//! 2 files, 4 B (de9b9ed78d7e2e1dceeffee780e2f9192f23c28e1edb9a4dd33d7a5d6bb8e4e0):
//!    ./a.txt
//!    ./b.txt
//! ```
//!
//! Group headers are bold when color is enabled.

use std::io::{self, Write};

use yansi::Paint;

use super::select_groups;
use crate::duplicates::FileGroups;
use crate::scanner::Algorithm;

/// Indentation before each member path.
const MEMBER_INDENT: &str = "   ";

/// Text formatter for a grouping.
#[derive(Debug)]
pub struct TextOutput<'a> {
    algorithm: Algorithm,
    groups: &'a FileGroups,
    show_all: bool,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter. Color is off until [`TextOutput::with_color`].
    #[must_use]
    pub fn new(algorithm: Algorithm, groups: &'a FileGroups, show_all: bool) -> Self {
        Self {
            algorithm,
            groups,
            show_all,
            color: false,
        }
    }

    /// Enable or disable bold group headers.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Algorithm: {}", self.algorithm.name())?;
        writeln!(writer)?;

        let selected = select_groups(self.groups, self.show_all);
        if selected.is_empty() {
            writeln!(writer, "No duplicates found.")?;
            return Ok(());
        }

        for group in selected {
            let count = group.files.len();
            let header = format!(
                "{count} {}, {}:",
                if count == 1 { "file" } else { "files" },
                group.key
            );
            if self.color {
                writeln!(writer, "{}", header.bold())?;
            } else {
                writeln!(writer, "{header}")?;
            }
            for path in group.files {
                writeln!(writer, "{MEMBER_INDENT}{}", path.display())?;
            }
        }
        writer.flush()
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
