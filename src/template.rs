// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Placeholder expansion for descriptor fields.
//!
//! Descriptor strings may contain `${Name}` placeholders that refer to
//! entries of an [`AliasTable`]. Expansion is a single pass over the input:
//! text substituted for a placeholder is never scanned again, so a directory
//! that happens to contain `${` stays intact.

use crate::alias::AliasTable;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Expand `${Name}` placeholders through an alias table.
#[derive(Debug, Clone, Copy)]
pub struct Template<'a> {
    aliases: &'a AliasTable,
}

impl<'a> Template<'a> {
    /// Construct new template resolver over an alias table.
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    /// Expand every placeholder in `input`.
    ///
    /// Placeholder names are trimmed, then looked up ignoring case. Unknown
    /// names expand to nothing, and an unterminated `${` is kept verbatim.
    /// Resolution never fails.
    pub fn resolve(&self, input: impl AsRef<str>) -> String {
        let mut rest = input.as_ref();
        let mut out = String::with_capacity(rest.len());

        while let Some(start) = rest.find(OPEN) {
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                break;
            };

            out.push_str(&rest[..start]);
            let name = after[..end].trim();
            if let Some(dir) = self.aliases.lookup(name) {
                out.push_str(dir.to_string_lossy().as_ref());
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}
