use crate::backend::EditorFlags;
use crate::command::Command;
use sheetsync_core::{Document, Operation, Result, SheetError};

/// Maximum number of undo entries to keep
pub const MAX_HISTORY: usize = 100;

/// Authoritative workbook plus its undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    pub document: Document,
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl History {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Execute a command and record it. Writes that leave a cell unchanged
    /// still report their result but are not recorded.
    pub fn execute(&mut self, command: Command) -> Result<Operation> {
        let command = command.capture(&self.document)?;
        let operation = command.execute(&mut self.document)?;
        if command.is_noop() {
            return Ok(operation);
        }
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        Ok(operation)
    }

    /// Undo the most recent command, returning what was applied.
    pub fn undo(&mut self) -> Result<Operation> {
        let command = self.undo_stack.pop().ok_or(SheetError::NothingToUndo)?;
        match command.inverse().execute(&mut self.document) {
            Ok(operation) => {
                self.redo_stack.push(command);
                Ok(operation)
            }
            Err(e) => {
                self.undo_stack.push(command);
                Err(e)
            }
        }
    }

    /// Redo the most recently undone command.
    pub fn redo(&mut self) -> Result<Operation> {
        let command = self.redo_stack.pop().ok_or(SheetError::NothingToRedo)?;
        match command.execute(&mut self.document) {
            Ok(operation) => {
                self.undo_stack.push(command);
                Ok(operation)
            }
            Err(e) => {
                self.redo_stack.push(command);
                Err(e)
            }
        }
    }

    pub fn flags(&self) -> EditorFlags {
        EditorFlags {
            can_undo: !self.undo_stack.is_empty(),
            can_redo: !self.redo_stack.is_empty(),
        }
    }
}
