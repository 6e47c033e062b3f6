//! Sequence-editor side of a rebase planned from the commit graph.
//!
//! Git writes its own todo list before handing it to the editor. The list it
//! wrote must be the one that was planned, otherwise the history changed in
//! between and the edited plan no longer applies.

use crate::entry::{format_todo, parse_todo, GeneratedEntry, RebaseEntry, TodoError};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("rebase todo has {real} entries, planned {generated}")]
    LengthMismatch { generated: usize, real: usize },

    #[error("rebase todo entry {index} is {real:?}, planned {generated:?}")]
    Diverged {
        index: usize,
        generated: RebaseEntry,
        real: RebaseEntry,
    },

    #[error("couldn't parse rebase todo: {0}")]
    Todo(#[from] TodoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Check git's todo list against the planned one, index for index.
pub fn validate_entries(generated: &[GeneratedEntry], real: &[RebaseEntry]) -> Result<(), EditorError> {
    if generated.len() != real.len() {
        return Err(EditorError::LengthMismatch {
            generated: generated.len(),
            real: real.len(),
        });
    }

    for (index, (planned, actual)) in generated.iter().zip(real).enumerate() {
        if !planned.equals_with_real(actual) {
            return Err(EditorError::Diverged {
                index,
                generated: planned.entry.clone(),
                real: actual.clone(),
            });
        }
    }

    Ok(())
}

/// Replaces git's todo list with the entries the user edited, provided git's
/// list still matches what was planned.
#[derive(Debug, Clone)]
pub struct LogRebaseEditorHandler {
    generated: Vec<GeneratedEntry>,
    new_entries: Vec<RebaseEntry>,
}

impl LogRebaseEditorHandler {
    pub fn new(generated: Vec<GeneratedEntry>, new_entries: Vec<RebaseEntry>) -> Self {
        Self { generated, new_entries }
    }

    pub fn collect_new_entries(&self, real: &[RebaseEntry]) -> Result<Vec<RebaseEntry>, EditorError> {
        validate_entries(&self.generated, real)?;
        Ok(self.new_entries.clone())
    }

    /// Validate the todo file git wrote and overwrite it with the edited
    /// entries. The file is left untouched on failure.
    pub fn rewrite_todo_file(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let real = parse_todo(&std::fs::read_to_string(path)?)?;
        let entries = self.collect_new_entries(&real)?;
        std::fs::write(path, format_todo(&entries))?;
        Ok(())
    }
}
