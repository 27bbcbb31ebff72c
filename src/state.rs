use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::cache::DatasetCache;
use crate::data::export::export_csv;
use crate::data::filter::{apply, FilterCriteria, TypeSelection};
use crate::data::model::{CatalogTable, Facets};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Genres,
    Duration,
    Text,
    Sentiment,
    Trends,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Overview,
        Tab::Genres,
        Tab::Duration,
        Tab::Text,
        Tab::Sentiment,
        Tab::Trends,
        Tab::Data,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Genres => "Genres",
            Tab::Duration => "Duration",
            Tab::Text => "Text Analysis",
            Tab::Sentiment => "Sentiment",
            Tab::Trends => "Trends",
            Tab::Data => "Data",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: DatasetCache,

    /// Source the current table came from (None until something loads).
    pub source: Option<PathBuf>,

    /// Enriched table; empty after a failed load.
    pub table: Arc<CatalogTable>,

    /// Option lists for the sidebar, computed once per table.
    pub facets: Facets,

    /// Current sidebar selections.
    pub criteria: FilterCriteria,

    /// Rows passing `criteria` (recomputed on every change).
    pub filtered: CatalogTable,

    /// Text box contents; mirrored into `criteria.title_query`.
    pub title_query: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub tab: Tab,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DatasetCache::default())
    }
}

impl AppState {
    pub fn new(cache: DatasetCache) -> Self {
        let table = Arc::new(CatalogTable::empty());
        Self {
            cache,
            source: None,
            facets: table.facets(),
            criteria: FilterCriteria::for_table(&table),
            filtered: CatalogTable::empty(),
            table,
            title_query: String::new(),
            status_message: None,
            tab: Tab::Overview,
        }
    }

    /// Load (or reuse) the table at `path`. A failure leaves an empty table
    /// and a status message; it never propagates.
    pub fn load_path(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        match self.cache.get_or_load(path) {
            Ok(table) => {
                self.status_message = None;
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error loading data: {e}"));
                self.set_table(Arc::new(CatalogTable::empty()));
            }
        }
    }

    /// Drop the cached table and read the current source again.
    pub fn reload(&mut self) {
        let path = self
            .source
            .clone()
            .or_else(|| self.cache.cached_key().map(|key| key.path.clone()));
        self.cache.invalidate();
        if let Some(path) = path {
            self.load_path(&path);
        }
    }

    /// Ingest a table, rebuild facets and start from unconstrained criteria.
    pub fn set_table(&mut self, table: Arc<CatalogTable>) {
        self.facets = table.facets();
        self.table = table;
        self.reset_filters();
    }

    /// Recompute `filtered` from the cached table.
    pub fn refilter(&mut self) {
        self.filtered = apply(&self.table, &self.criteria);
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::for_table(&self.table);
        self.title_query.clear();
        self.refilter();
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.criteria = self.criteria.clone().with_year_range(lo, hi);
        self.refilter();
    }

    pub fn set_content_type(&mut self, selection: TypeSelection) {
        self.criteria = self.criteria.clone().with_content_type(selection);
        self.refilter();
    }

    pub fn set_title_query(&mut self, query: &str) {
        self.title_query = query.to_string();
        self.criteria = self.criteria.clone().with_title_query(query);
        self.refilter();
    }

    pub fn toggle_country(&mut self, country: &str) {
        toggle(&mut self.criteria.countries, country);
        self.refilter();
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        toggle(&mut self.criteria.genres, genre);
        self.refilter();
    }

    /// Drop the country constraint (every country passes).
    pub fn clear_countries(&mut self) {
        self.criteria = self.criteria.clone().with_countries(Vec::<String>::new());
        self.refilter();
    }

    pub fn clear_genres(&mut self) {
        self.criteria.genres = None;
        self.refilter();
    }

    /// Select every genre explicitly.
    pub fn select_all_genres(&mut self) {
        self.criteria = self
            .criteria
            .clone()
            .with_genres(self.facets.genres.iter().cloned());
        self.refilter();
    }

    /// Write the filtered rows to `path` and report the outcome in the
    /// status line.
    pub fn export_filtered(&mut self, path: &Path) {
        match export_csv(&self.filtered, path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} titles to {}",
                    self.filtered.len(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Flip `value` in a multi-select; an emptied selection becomes `None`.
fn toggle(selection: &mut Option<BTreeSet<String>>, value: &str) {
    let mut set = selection.take().unwrap_or_default();
    if !set.remove(value) {
        set.insert(value.to_string());
    }
    *selection = if set.is_empty() { None } else { Some(set) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::{KeywordScorer, HEADER};

    fn state_with(rows: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, format!("{HEADER}\n{rows}")).unwrap();
        let mut state = AppState::new(DatasetCache::new(Box::new(KeywordScorer)));
        state.load_path(&path);
        (dir, state)
    }

    const ROWS: &str = concat!(
        "a,Movie,Love Actually,,,United Kingdom,\"December 1, 2019\",2003,,135 min,\"Comedies, Romantic Movies\",\n",
        "b,Movie,The Matrix,,,United States,\"June 1, 2021\",1999,,136 min,Sci-Fi & Fantasy,\n",
        "c,TV Show,Sacred Games,,,India,\"July 6, 2020\",2018,,2 Seasons,Crime TV Shows,\n",
    );

    #[test]
    fn load_starts_unfiltered() {
        let (_dir, state) = state_with(ROWS);
        assert_eq!(state.table.len(), 3);
        assert_eq!(state.filtered.len(), 3);
        assert_eq!(state.criteria.year_range, (2019, 2021));
        assert_eq!(state.facets.countries.len(), 3);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_load_degrades_to_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "title\nA\n").unwrap();

        let mut state = AppState::new(DatasetCache::new(Box::new(KeywordScorer)));
        state.load_path(&path);
        assert!(state.table.is_empty());
        assert!(state.filtered.is_empty());
        assert!(state.status_message.as_deref().unwrap().contains("missing required columns"));
        assert_eq!(state.criteria.year_range, crate::data::model::DEFAULT_YEAR_RANGE);
    }

    #[test]
    fn controls_refilter_immediately() {
        let (_dir, mut state) = state_with(ROWS);

        state.toggle_country("India");
        assert_eq!(state.filtered.titles().collect::<Vec<_>>(), vec!["Sacred Games"]);
        state.toggle_country("India");
        assert_eq!(state.criteria.countries, None);
        assert_eq!(state.filtered.len(), 3);

        state.set_content_type(TypeSelection::Movie);
        state.set_year_range(2021, 2020);
        assert_eq!(state.criteria.year_range, (2020, 2021));
        assert_eq!(state.filtered.titles().collect::<Vec<_>>(), vec!["The Matrix"]);

        state.set_title_query("LOVE");
        assert!(state.filtered.is_empty());

        state.reset_filters();
        assert_eq!(state.filtered.len(), 3);
        assert!(state.title_query.is_empty());
    }

    #[test]
    fn genre_selection_helpers() {
        let (_dir, mut state) = state_with(ROWS);
        state.toggle_genre("Crime TV Shows");
        assert_eq!(state.filtered.len(), 1);
        state.select_all_genres();
        assert_eq!(state.filtered.len(), 3);
        state.clear_genres();
        assert_eq!(state.criteria.genres, None);
    }

    #[test]
    fn export_reports_in_status_line() {
        let (dir, mut state) = state_with(ROWS);
        state.toggle_country("United States");
        let out = dir.path().join("out.csv");
        state.export_filtered(&out);
        assert!(state.status_message.as_deref().unwrap().starts_with("Exported 1 titles"));
        assert_eq!(std::fs::read_to_string(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn reload_picks_up_edited_file() {
        let (dir, mut state) = state_with(ROWS);
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, format!("{HEADER}\n{}", ROWS.lines().next().unwrap())).unwrap();

        state.reload();
        assert_eq!(state.table.len(), 1);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn reload_retries_the_failed_source() {
        let (dir, mut state) = state_with(ROWS);
        let missing = dir.path().join("missing.csv");
        state.load_path(&missing);
        assert!(state.table.is_empty());

        state.reload();
        assert_eq!(state.source.as_deref(), Some(missing.as_path()));
        assert!(state.table.is_empty());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error loading data"));

        std::fs::write(&missing, format!("{HEADER}\n{}", ROWS.lines().next().unwrap())).unwrap();
        state.reload();
        assert_eq!(state.table.len(), 1);
        assert!(state.status_message.is_none());
    }
}
