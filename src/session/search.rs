//! Search coordinator: query text, scope and the last result list.

use super::client::OperationClient;
use sheetsync_core::Result;
use sheetsync_engine::{Backend, SearchMatch, SearchScope};

#[derive(Debug, Default)]
pub struct SearchPanel {
    pub query: String,
    pub scope: SearchScope,
    results: Vec<SearchMatch>,
    cursor: usize,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_scope(&mut self) {
        self.scope = match self.scope {
            SearchScope::CurrentSheet => SearchScope::AllSheets,
            SearchScope::AllSheets => SearchScope::CurrentSheet,
        };
    }

    /// Ask the backend for matches. An empty query is never sent.
    pub fn run<B: Backend>(
        &mut self,
        client: &mut OperationClient<B>,
        active_sheet: usize,
    ) -> Result<usize> {
        self.cursor = 0;
        if self.query.is_empty() {
            self.results.clear();
            return Ok(0);
        }
        self.results = client.search(&self.query, self.scope, Some(active_sheet))?;
        Ok(self.results.len())
    }

    pub fn results(&self) -> &[SearchMatch] {
        &self.results
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// The match at `index`, making it the current one.
    pub fn choose(&mut self, index: usize) -> Option<SearchMatch> {
        let found = self.results.get(index).cloned()?;
        self.cursor = index;
        Some(found)
    }

    pub fn selected(&self) -> Option<&SearchMatch> {
        self.results.get(self.cursor)
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.cursor = 0;
    }
}
