use std::time::Duration;

use super::{Debouncer, GridBackend, GridError, Selection};
use crate::store::{ColumnFilters, FilterColumn, PageRequest, QueryMode, TranslationRow};

/// Edit dialog contents for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub id: i32,
    pub key: Option<String>,
    pub english_text: String,
    pub value: String,
}

pub struct GridController<B> {
    backend: B,
    page: u64,
    page_size: u64,
    rows: Vec<TranslationRow>,
    total: u64,
    total_pages: u64,
    /// Filters the loaded page was fetched with
    filters: ColumnFilters,
    /// Filters as typed, possibly not applied yet
    filter_inputs: ColumnFilters,
    debouncer: Debouncer<ColumnFilters>,
    selection: Selection,
    editor: Option<EditorState>,
}

impl<B: GridBackend> GridController<B> {
    pub fn new(backend: B, page_size: u64, filter_debounce: Duration) -> Self {
        Self {
            backend,
            page: 1,
            page_size: page_size.max(1),
            rows: Vec::new(),
            total: 0,
            total_pages: 0,
            filters: ColumnFilters::new(),
            filter_inputs: ColumnFilters::new(),
            debouncer: Debouncer::new(filter_debounce),
            selection: Selection::default(),
            editor: None,
        }
    }

    pub fn rows(&self) -> &[TranslationRow] {
        &self.rows
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn editor(&self) -> Option<&EditorState> {
        self.editor.as_ref()
    }

    pub fn filters(&self) -> &ColumnFilters {
        &self.filters
    }

    pub fn filter_input(&self, column: FilterColumn) -> &str {
        self.filter_inputs.get(&column).map(String::as_str).unwrap_or("")
    }

    /// Reload the current page with the committed filters
    pub async fn refresh(&mut self) -> Result<(), GridError> {
        let request = PageRequest::new(self.page, self.page_size)?;
        let page = self
            .backend
            .fetch_page(request, QueryMode::Columns(self.filters.clone()))
            .await?;

        self.rows = page.data;
        self.total = page.total;
        self.total_pages = page.total_pages;
        self.selection.prune(&self.rows);
        if let Some(editor) = &self.editor {
            if !self.rows.iter().any(|r| r.id == editor.id && !r.is_translated) {
                self.editor = None;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------

    pub async fn go_to_page(&mut self, page: u64) -> Result<(), GridError> {
        self.page = page.clamp(1, self.total_pages.max(1));
        self.refresh().await
    }

    pub async fn next_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(self.page + 1).await
    }

    pub async fn prev_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(self.page.saturating_sub(1)).await
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Record a filter edit and (re)start the debounce timer
    pub fn set_filter(&mut self, column: FilterColumn, value: &str) {
        if value.is_empty() {
            self.filter_inputs.remove(&column);
        } else {
            self.filter_inputs.insert(column, value.to_string());
        }
        self.debouncer.schedule(self.filter_inputs.clone());
    }

    pub fn filter_debounce(&self) -> Duration {
        self.debouncer.delay()
    }

    pub fn has_pending_filters(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait for the debounce delay and apply the latest filters. Returns
    /// whether anything was applied.
    pub async fn await_filters(&mut self) -> Result<bool, GridError> {
        match self.debouncer.next().await {
            Some(filters) => {
                self.apply_filters(filters).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply pending filters without waiting for the timer
    pub async fn flush_filters(&mut self) -> Result<bool, GridError> {
        match self.debouncer.flush() {
            Some(filters) => {
                self.apply_filters(filters).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop typed and applied filters alike and reload from page 1
    pub async fn clear_filters(&mut self) -> Result<(), GridError> {
        self.debouncer.cancel();
        self.filter_inputs.clear();
        self.apply_filters(ColumnFilters::new()).await
    }

    async fn apply_filters(&mut self, filters: ColumnFilters) -> Result<(), GridError> {
        tracing::debug!("Applying {} grid filters", filters.len());
        self.filters = filters;
        self.page = 1;
        self.refresh().await
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn toggle(&mut self, id: i32) -> Result<bool, GridError> {
        let row = self.editable_row(id)?;
        let row = row.clone();
        Ok(self.selection.toggle(&row))
    }

    pub fn select_all_eligible(&mut self) {
        self.selection.select_all_eligible(&self.rows);
    }

    pub fn select_range(&mut self, start: i32, end: i32) -> Result<usize, GridError> {
        self.selection.select_range(&self.rows, start, end)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Save a draft typed directly into the grid
    pub async fn edit_cell(&mut self, id: i32, value: &str) -> Result<(), GridError> {
        self.editable_row(id)?;
        self.backend.update_draft(id, value).await?;
        self.patch_draft(id, value);
        Ok(())
    }

    pub fn open_editor(&mut self, id: i32) -> Result<&EditorState, GridError> {
        let row = self.editable_row(id)?;
        let editor = EditorState {
            id,
            key: row.key.clone(),
            english_text: row.english_text.clone(),
            value: row.temp_hungarian.clone().unwrap_or_default(),
        };
        Ok(self.editor.insert(editor))
    }

    pub fn set_editor_value(&mut self, value: &str) -> Result<(), GridError> {
        let editor = self.editor.as_mut().ok_or(GridError::NoEditor)?;
        editor.value = value.to_string();
        Ok(())
    }

    /// Persist the dialog value as the row's draft and close the dialog. The
    /// dialog stays open when saving fails.
    pub async fn save_editor(&mut self) -> Result<(), GridError> {
        let editor = self.editor.take().ok_or(GridError::NoEditor)?;
        match self.edit_cell(editor.id, &editor.value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.editor = Some(editor);
                Err(e)
            }
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    // ------------------------------------------------------------------
    // Gateway actions
    // ------------------------------------------------------------------

    /// Translate one row through the gateway and store the result as its draft
    pub async fn translate_row(&mut self, id: i32, model_id: &str) -> Result<String, GridError> {
        let english = self.editable_row(id)?.english_text.clone();
        let translation = self.backend.translate(&english, model_id).await?;
        self.backend.update_draft(id, &translation).await?;
        self.patch_draft(id, &translation);

        if let Some(editor) = self.editor.as_mut().filter(|e| e.id == id) {
            editor.value = translation.clone();
        }
        Ok(translation)
    }

    /// Translate every selected row on the page, one at a time, in display
    /// order. Stops at the first failure; drafts saved before it are kept.
    pub async fn bulk_translate(&mut self, model_id: &str) -> Result<usize, GridError> {
        let targets: Vec<(i32, String)> = self
            .selection
            .in_display_order(&self.rows)
            .into_iter()
            .filter(|row| !row.is_translated)
            .map(|row| (row.id, row.english_text.clone()))
            .collect();
        if targets.is_empty() {
            return Err(GridError::EmptySelection);
        }

        for (completed, (id, english)) in targets.iter().enumerate() {
            let result = match self.backend.translate(english, model_id).await {
                Ok(translation) => self
                    .backend
                    .update_draft(*id, &translation)
                    .await
                    .map(|()| translation),
                Err(e) => Err(e),
            };

            match result {
                Ok(translation) => self.patch_draft(*id, &translation),
                Err(source) => {
                    tracing::warn!("Bulk translation halted at row {}: {}", id, source);
                    return Err(GridError::BulkHalted {
                        id: *id,
                        completed,
                        source,
                    });
                }
            }
        }

        tracing::info!("Bulk translated {} rows", targets.len());
        self.refresh().await?;
        Ok(targets.len())
    }

    /// Finalize every selected row, then clear the selection and reload
    pub async fn finalize_selected(&mut self) -> Result<u64, GridError> {
        let ids: Vec<i32> = self
            .selection
            .in_display_order(&self.rows)
            .into_iter()
            .map(|row| row.id)
            .collect();
        if ids.is_empty() {
            return Err(GridError::EmptySelection);
        }
        let finalized = self.backend.finalize(&ids).await?;
        self.selection.clear();
        self.refresh().await?;
        Ok(finalized)
    }

    fn editable_row(&self, id: i32) -> Result<&TranslationRow, GridError> {
        let row = self
            .rows
            .iter()
            .find(|row| row.id == id)
            .ok_or(GridError::RowNotLoaded(id))?;
        if row.is_translated {
            return Err(GridError::RowFinalized(id));
        }
        Ok(row)
    }

    fn patch_draft(&mut self, id: i32, value: &str) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.temp_hungarian = Some(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gateway::testing::ScriptedTranslator;
    use crate::grid::LocalBackend;
    use crate::store::testing::{seeded_store, SeedRow};
    use crate::store::{testing, TranslationStore};
    use tempfile::TempDir;

    const DEBOUNCE: Duration = Duration::from_millis(50);

    async fn controller(
        translator: ScriptedTranslator,
        page_size: u64,
    ) -> (TempDir, TranslationStore, Arc<ScriptedTranslator>, GridController<LocalBackend>) {
        let (dir, store) = seeded_store().await;
        let translator = Arc::new(translator);
        let backend = LocalBackend::new(store.clone(), translator.clone());
        let mut grid = GridController::new(backend, page_size, DEBOUNCE);
        grid.refresh().await.unwrap();
        (dir, store, translator, grid)
    }

    fn row_ids(grid: &GridController<LocalBackend>) -> Vec<i32> {
        grid.rows().iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_refresh_and_paging() {
        let (_dir, _store, _t, mut grid) = controller(ScriptedTranslator::default(), 2).await;
        assert_eq!(row_ids(&grid), vec![3, 2]);
        assert_eq!(grid.total(), 5);
        assert_eq!(grid.total_pages(), 3);

        grid.next_page().await.unwrap();
        assert_eq!(grid.page(), 2);
        assert_eq!(row_ids(&grid), vec![5, 4]);

        grid.go_to_page(99).await.unwrap();
        assert_eq!(grid.page(), 3);
        assert_eq!(row_ids(&grid), vec![1]);

        grid.next_page().await.unwrap();
        assert_eq!(grid.page(), 3);

        grid.go_to_page(1).await.unwrap();
        grid.prev_page().await.unwrap();
        assert_eq!(grid.page(), 1);
    }

    #[tokio::test]
    async fn test_debounced_filters_apply_latest_state_once() {
        let (_dir, _store, _t, mut grid) = controller(ScriptedTranslator::default(), 2).await;
        grid.next_page().await.unwrap();

        grid.set_filter(FilterColumn::EnglishText, "q");
        grid.set_filter(FilterColumn::EnglishText, "qu");
        grid.set_filter(FilterColumn::EnglishText, "quit");
        assert_eq!(grid.filter_input(FilterColumn::EnglishText), "quit");
        // Still showing the old page until the delay passes
        assert!(grid.filters().is_empty());
        assert!(grid.has_pending_filters());

        assert!(grid.await_filters().await.unwrap());
        assert_eq!(grid.page(), 1);
        assert_eq!(row_ids(&grid), vec![5]);
        assert!(!grid.await_filters().await.unwrap());
    }

    #[tokio::test]
    async fn test_flush_filters_and_clearing() {
        let (_dir, _store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;

        grid.set_filter(FilterColumn::IsTranslated, "false");
        grid.set_filter(FilterColumn::Filename, "dialog");
        assert!(grid.flush_filters().await.unwrap());
        assert_eq!(row_ids(&grid), vec![4, 1]);

        grid.set_filter(FilterColumn::Filename, "");
        assert!(grid.flush_filters().await.unwrap());
        assert_eq!(grid.total(), 5);
        assert!(!grid.flush_filters().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_filters_drops_pending_input() {
        let (_dir, _store, _t, mut grid) = controller(ScriptedTranslator::default(), 2).await;
        grid.set_filter(FilterColumn::Key, "menu");
        grid.flush_filters().await.unwrap();
        assert_eq!(grid.total(), 3);

        grid.set_filter(FilterColumn::EnglishText, "quit");
        grid.clear_filters().await.unwrap();

        assert!(!grid.has_pending_filters());
        assert!(grid.filters().is_empty());
        assert_eq!(grid.filter_input(FilterColumn::Key), "");
        assert_eq!(grid.page(), 1);
        assert_eq!(grid.total(), 5);
        assert!(!grid.await_filters().await.unwrap());
    }

    #[tokio::test]
    async fn test_selection_rules() {
        let (_dir, store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        store.finalize(&[2]).await.unwrap();
        grid.refresh().await.unwrap();

        assert!(matches!(grid.toggle(2), Err(GridError::RowFinalized(2))));
        assert!(matches!(grid.toggle(42), Err(GridError::RowNotLoaded(42))));
        assert!(grid.toggle(3).unwrap());

        grid.select_all_eligible();
        assert_eq!(grid.selection().ids(), vec![1, 3, 4, 5]);

        grid.clear_selection();
        // Display order is 3, 2, 5, 4, 1
        assert_eq!(grid.select_range(3, 4).unwrap(), 3);
        assert_eq!(grid.selection().ids(), vec![3, 4, 5]);
        assert!(grid.select_range(3, 99).is_err());
    }

    #[tokio::test]
    async fn test_edit_cell_and_dialog() {
        let (_dir, store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;

        grid.edit_cell(4, "Helló, utazó").await.unwrap();
        assert_eq!(store.get(4).await.unwrap().unwrap().temp_hungarian.as_deref(), Some("Helló, utazó"));

        let editor = grid.open_editor(3).unwrap();
        assert_eq!(editor.value, "Játék indítása");
        assert_eq!(editor.key.as_deref(), Some("menu.start"));
        grid.set_editor_value("Új játék").unwrap();
        grid.save_editor().await.unwrap();
        assert!(grid.editor().is_none());

        let row = grid.rows().iter().find(|r| r.id == 3).unwrap();
        assert_eq!(row.temp_hungarian.as_deref(), Some("Új játék"));

        grid.open_editor(5).unwrap();
        grid.cancel_editor();
        assert!(grid.editor().is_none());
        assert!(matches!(grid.save_editor().await, Err(GridError::NoEditor)));
    }

    #[tokio::test]
    async fn test_finalized_rows_are_read_only() {
        let (_dir, store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        store.finalize(&[5]).await.unwrap();
        grid.refresh().await.unwrap();

        assert!(matches!(grid.open_editor(5), Err(GridError::RowFinalized(5))));
        assert!(matches!(grid.edit_cell(5, "x").await, Err(GridError::RowFinalized(5))));
        assert_eq!(store.get(5).await.unwrap().unwrap().final_hungarian.as_deref(), Some("Kilépés 100%"));
    }

    #[tokio::test]
    async fn test_translate_row_stages_draft() {
        let (_dir, store, translator, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        grid.open_editor(4).unwrap();

        let translation = grid.translate_row(4, "deepseek").await.unwrap();
        assert_eq!(translation, "HU: Hello, traveler");
        assert_eq!(grid.editor().unwrap().value, "HU: Hello, traveler");

        let stored = store.get(4).await.unwrap().unwrap();
        assert_eq!(stored.temp_hungarian.as_deref(), Some("HU: Hello, traveler"));
        assert!(!stored.is_translated);
        assert_eq!(translator.calls(), vec!["Hello, traveler".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_row_with_unknown_model() {
        let (_dir, store, translator, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        let err = grid.translate_row(4, "unknown").await.unwrap_err();
        assert!(matches!(err, GridError::Backend(crate::error::ServerError::Configuration(_))));
        assert!(translator.calls().is_empty());
        assert!(store.get(4).await.unwrap().unwrap().temp_hungarian.is_none());
    }

    #[tokio::test]
    async fn test_bulk_translate_halts_on_first_failure() {
        let translator = ScriptedTranslator::failing_on(&["Options"]);
        let (_dir, store, translator, mut grid) = controller(translator, 10).await;

        // Display order: 3 (Start Game), 2 (Options), 5 (Quit to Desktop)
        grid.select_range(3, 5).unwrap();
        let err = grid.bulk_translate("mistral").await.unwrap_err();

        match err {
            GridError::BulkHalted { id, completed, .. } => {
                assert_eq!(id, 2);
                assert_eq!(completed, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(store.get(3).await.unwrap().unwrap().temp_hungarian.as_deref(), Some("HU: Start Game"));
        assert_eq!(store.get(2).await.unwrap().unwrap().temp_hungarian.as_deref(), Some("Beállítások"));
        assert_eq!(store.get(5).await.unwrap().unwrap().temp_hungarian.as_deref(), Some("Kilépés 100%"));
        // Row 5 was never sent
        assert_eq!(translator.calls(), vec!["Start Game".to_string(), "Options".to_string()]);
    }

    #[tokio::test]
    async fn test_bulk_translate_all_selected() {
        let (_dir, store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        assert!(matches!(grid.bulk_translate("gemma").await, Err(GridError::EmptySelection)));

        grid.toggle(1).unwrap();
        grid.toggle(4).unwrap();
        assert_eq!(grid.bulk_translate("gemma").await.unwrap(), 2);
        assert_eq!(store.get(1).await.unwrap().unwrap().temp_hungarian.as_deref(), Some("HU: Goodbye"));
        // Selection survives so the drafts can be finalized next
        assert_eq!(grid.selection().ids(), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_finalize_selected() {
        let (_dir, store, _t, mut grid) = controller(ScriptedTranslator::default(), 10).await;
        assert!(matches!(grid.finalize_selected().await, Err(GridError::EmptySelection)));

        grid.toggle(3).unwrap();
        grid.toggle(2).unwrap();
        assert_eq!(grid.finalize_selected().await.unwrap(), 2);
        assert!(grid.selection().is_empty());

        let finalized: Vec<i32> = grid.rows().iter().filter(|r| r.is_translated).map(|r| r.id).collect();
        assert_eq!(finalized, vec![3, 2]);
        assert!(store.get(2).await.unwrap().unwrap().is_translated);
    }

    #[tokio::test]
    async fn test_selection_does_not_follow_page_changes() {
        let (_dir, store, translator, mut grid) = controller(ScriptedTranslator::default(), 2).await;
        grid.toggle(3).unwrap();
        assert_eq!(grid.selection().ids(), vec![3]);

        grid.next_page().await.unwrap();
        assert!(grid.selection().is_empty());

        assert!(matches!(grid.bulk_translate("deepseek").await, Err(GridError::EmptySelection)));
        assert!(matches!(grid.finalize_selected().await, Err(GridError::EmptySelection)));
        assert!(translator.calls().is_empty());
        assert!(!store.get(3).await.unwrap().unwrap().is_translated);

        // Filtering reloads the page and drops the selection as well
        grid.prev_page().await.unwrap();
        grid.toggle(2).unwrap();
        grid.set_filter(FilterColumn::Key, "quit");
        grid.flush_filters().await.unwrap();
        assert!(grid.selection().is_empty());
    }

    #[tokio::test]
    async fn test_single_row_store() {
        let (_dir, store) = testing::empty_store().await;
        let file_id = testing::insert_file(&store, "a.txt").await;
        testing::insert_row(&store, SeedRow { file_id, line_number: 1, key: None, english: "Yes", draft: None }).await;

        let backend = LocalBackend::new(store, Arc::new(ScriptedTranslator::default()));
        let mut grid = GridController::new(backend, 50, DEBOUNCE);
        grid.refresh().await.unwrap();
        assert_eq!(grid.total_pages(), 1);
        assert_eq!(grid.rows()[0].english_text, "Yes");
    }
}
