//! Plain text output.
//!
//! One path per line, groups separated by a blank line, in the order the
//! reporter yields them. With no groups a single line says so.

use std::io::{self, Write};

use crate::duplicates::DuplicateGroup;

/// Message printed when the scan found nothing.
pub const NO_DUPLICATES_MESSAGE: &str = "No duplicates found.";

/// Text formatter over a slice of groups.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextOutput<'a> {
    /// Create a formatter for `groups`.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the listing.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "{NO_DUPLICATES_MESSAGE}")?;
            return Ok(());
        }

        for (idx, group) in self.groups.iter().enumerate() {
            if idx > 0 {
                writeln!(writer)?;
            }
            for file in &group.files {
                writeln!(writer, "{}", file.path.display())?;
            }
        }
        Ok(())
    }

    /// Render the listing into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
