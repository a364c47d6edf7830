use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{clamp_shape_count, StoreConfig};
use crate::history::History;
use crate::palette::{Color, ColorId, Palette};
use crate::prng::Prng;
use crate::shape::{Shape, ShapeId};
use crate::share::{self, ShareError};
use crate::state::{CanvasUpdate, FiltersUpdate, MeshState, UiState};

/// What the gallery/persistence layer needs to file a gradient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSummary {
    pub share: String,
    pub shapes_count: usize,
    pub colors_count: usize,
}

/// Owner of the gradient state and its undo/redo history.
///
/// Every mutating action snapshots the current state into history, clears the
/// redo stack, then installs the new state. Reads hand out borrows or clones;
/// nothing outside the store writes to the state directly.
#[derive(Debug, Clone)]
pub struct MeshStore {
    state: MeshState,
    history: History,
    ui: UiState,
    config: StoreConfig,
}

impl MeshStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_state(MeshState::initial(&config.generator), config)
    }

    /// Adopt an existing state (e.g. from local storage), restoring its invariants.
    pub fn with_state(mut state: MeshState, config: StoreConfig) -> Self {
        state.normalize();
        if state.ensure_shapes(config.default_shape_count, &config.generator) {
            log::info!("state had no shapes, regenerated from seed {:?}", state.seed);
        }
        Self {
            state,
            history: History::with_limit(config.history_limit),
            ui: UiState::default(),
            config,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn state(&self) -> &MeshState {
        &self.state
    }

    /// Owned copy of the current state, detached from later mutations.
    pub fn snapshot(&self) -> MeshState {
        self.state.clone()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.state.selected_shape_id.and_then(|id| self.state.shape(id))
    }

    // ── Mutations ────────────────────────────────────────────────────

    fn commit(&mut self, label: &'static str, next: MeshState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.history.record(label, previous);
        log::debug!(
            "{label}: {} shapes, {} colors, {} undo steps",
            self.state.shapes.len(),
            self.state.palette.len(),
            self.history.past_len()
        );
    }

    /// Regenerate every shape from `seed` (or a fresh time-derived one).
    /// `count` defaults to the current shape count; either way it is clamped to 3..=10.
    pub fn randomize(&mut self, seed: Option<&str>, count: Option<usize>) {
        let count = clamp_shape_count(count.unwrap_or(self.state.shapes.len()));
        let mut next = self.state.clone();
        next.seed = match seed {
            Some(s) => s.to_string(),
            None => fresh_seed(),
        };
        next.regenerate(count, &self.config.generator);
        self.commit("Randomize", next);
    }

    /// Regenerate with the current seed and a new (clamped) count.
    pub fn set_shape_count(&mut self, count: usize) {
        let seed = self.state.seed.clone();
        self.randomize(Some(&seed), Some(count));
    }

    /// Replace the palette, re-clamping fill indices and re-syncing the background.
    /// An empty palette is ignored: index 0 must exist as the background.
    pub fn set_palette(&mut self, palette: Palette) {
        if palette.is_empty() {
            log::warn!("ignoring empty palette");
            return;
        }
        let mut next = self.state.clone();
        next.palette = palette;
        next.sync_palette();
        self.commit("Set palette", next);
    }

    pub fn add_color(&mut self, value: &str) -> ColorId {
        let color = Color::new(value);
        let id = color.id;
        let mut palette = self.state.palette.clone();
        palette.push(color);
        self.set_palette(palette);
        id
    }

    /// Remove a color by id. Refused when it is the last color or unknown.
    pub fn remove_color(&mut self, id: ColorId) -> bool {
        if self.state.palette.len() <= 1 {
            return false;
        }
        let mut palette = self.state.palette.clone();
        if palette.remove(id).is_none() {
            return false;
        }
        self.set_palette(palette);
        true
    }

    pub fn update_color(&mut self, id: ColorId, value: &str) -> bool {
        let mut palette = self.state.palette.clone();
        if !palette.update(id, value) {
            return false;
        }
        self.set_palette(palette);
        true
    }

    pub fn move_color(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let mut palette = self.state.palette.clone();
        if !palette.move_entry(from, to) {
            return false;
        }
        self.set_palette(palette);
        true
    }

    /// Merge filter changes (blur clamped to 0..=256, grain to 0..=1).
    pub fn set_filters(&mut self, update: FiltersUpdate) {
        let mut next = self.state.clone();
        next.filters = next.filters.with(update);
        self.commit("Set filters", next);
    }

    /// Merge canvas changes (sides clamped to 64..=6000).
    pub fn set_canvas(&mut self, update: CanvasUpdate) {
        let mut next = self.state.clone();
        next.canvas = next.canvas.with(update);
        self.commit("Set canvas", next);
    }

    /// Replace the whole shape list (drag, resize, spread adapters).
    pub fn set_shapes(&mut self, shapes: Vec<Shape>) {
        let mut next = self.state.clone();
        next.shapes = shapes;
        next.normalize();
        self.commit("Set shapes", next);
    }

    /// Draw `id` one step later, i.e. on top of its next neighbour.
    /// No-op when it is already topmost or unknown.
    pub fn move_shape_up(&mut self, id: ShapeId) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        if i + 1 >= self.state.shapes.len() {
            return false;
        }
        let mut next = self.state.clone();
        next.shapes.swap(i, i + 1);
        self.commit("Move shape up", next);
        true
    }

    /// Draw `id` one step earlier. No-op when it is already bottommost or unknown.
    pub fn move_shape_down(&mut self, id: ShapeId) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        if i == 0 {
            return false;
        }
        let mut next = self.state.clone();
        next.shapes.swap(i, i - 1);
        self.commit("Move shape down", next);
        true
    }

    /// Reassign every fill index uniformly over the palette.
    pub fn shuffle_colors(&mut self) {
        self.shuffle_colors_with_nonce(time_nonce());
    }

    /// Deterministic shuffle: the stream is keyed on seed, history depth and `nonce`.
    pub fn shuffle_colors_with_nonce(&mut self, nonce: u64) {
        let key = format!("{}:shuffle:{}:{}", self.state.seed, self.history.past_len(), nonce);
        let mut rng = Prng::new(&key);
        let len = self.state.palette.len().max(1);
        let mut next = self.state.clone();
        for shape in &mut next.shapes {
            shape.fill_index = rng.index(len);
        }
        self.commit("Shuffle colors", next);
    }

    /// Apply `updater` to the shape with `id`. No-op when the id is unknown.
    pub fn update_shape<F>(&mut self, id: ShapeId, updater: F) -> bool
    where
        F: FnOnce(&Shape) -> Shape,
    {
        let Some(i) = self.position(id) else {
            return false;
        };
        let mut next = self.state.clone();
        next.shapes[i] = updater(&next.shapes[i]);
        next.normalize();
        self.commit("Update shape", next);
        true
    }

    /// Change the selection. Selection changes are not undoable.
    pub fn select_shape(&mut self, id: Option<ShapeId>) {
        self.state.selected_shape_id = id.filter(|id| self.state.shape(*id).is_some());
    }

    pub fn set_ui(&mut self, ui: UiState) {
        self.ui = ui;
    }

    fn position(&self, id: ShapeId) -> Option<usize> {
        self.state.shapes.iter().position(|s| s.id == id)
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.state.clone()) {
            Some(previous) => {
                self.state = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.state.clone()) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    // ── Sharing ──────────────────────────────────────────────────────

    pub fn to_share_string(&self) -> Result<String, ShareError> {
        share::encode(&self.state)
    }

    /// Replace the whole state from a share string and discard history.
    /// On error the current state and history are untouched.
    pub fn from_share_string(&mut self, encoded: &str) -> Result<(), ShareError> {
        let mut next = match share::decode(encoded, MeshState::initial(&self.config.generator)) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("rejected share string: {e}");
                return Err(e);
            }
        };
        next.normalize();
        next.ensure_shapes(self.config.default_shape_count, &self.config.generator);
        self.state = next;
        self.history.clear();
        Ok(())
    }

    pub fn share_summary(&self) -> Result<ShareSummary, ShareError> {
        Ok(ShareSummary {
            share: self.to_share_string()?,
            shapes_count: self.state.shapes.len(),
            colors_count: self.state.palette.len(),
        })
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

fn time_nonce() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Time-derived seed. The per-process counter separates calls made within
/// the same millisecond.
fn fresh_seed() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("seed-{:x}-{n:x}", time_nonce())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn store() -> MeshStore {
        MeshStore::default()
    }

    fn json(state: &MeshState) -> String {
        serde_json::to_string(state).unwrap()
    }

    #[test]
    fn test_initial_store() {
        let s = store();
        assert_eq!(s.state().shapes.len(), 6);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn test_undo_redo_laws() {
        let mut s = store();
        let s0 = json(s.state());
        s.randomize(Some("next"), Some(8));
        let s1 = json(s.state());
        assert_ne!(s0, s1);

        assert!(s.undo());
        assert_eq!(json(s.state()), s0);
        assert!(s.redo());
        assert_eq!(json(s.state()), s1);
    }

    #[test]
    fn test_mutation_after_undo_clears_redo() {
        let mut s = store();
        s.set_filters(FiltersUpdate {
            blur: Some(10.0),
            ..Default::default()
        });
        assert!(s.undo());
        s.set_filters(FiltersUpdate {
            blur: Some(20.0),
            ..Default::default()
        });
        let before = json(s.state());
        assert!(!s.redo());
        assert_eq!(json(s.state()), before);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut s = store();
        let before = json(s.state());
        assert!(!s.undo());
        assert_eq!(json(s.state()), before);
        assert_eq!(s.history().future_len(), 0);
    }

    #[test]
    fn test_randomize_clamps_count() {
        let mut s = store();
        s.randomize(Some("a"), Some(50));
        assert_eq!(s.state().shapes.len(), 10);
        s.randomize(Some("a"), Some(1));
        assert_eq!(s.state().shapes.len(), 3);
        s.randomize(None, None);
        assert_eq!(s.state().shapes.len(), 3);
        assert_ne!(s.state().seed, "a");
        assert_eq!(s.undo_label(), Some("Randomize"));
    }

    #[test]
    fn test_set_palette_clamps_fill_index() {
        let mut s = store();
        s.set_palette(Palette::from_hex(&["#000000", "#ffffff"]));
        // Plant a dangling index the way a stale adapter would.
        s.state.shapes[0].fill_index = 5;

        let palette = Palette::from_hex(&["#111111", "#eeeeee"]);
        s.set_palette(palette.clone());
        assert_eq!(s.state().shapes[0].fill_index, 1);
        assert!(s.state().shapes.iter().all(|sh| sh.fill_index <= 1));
        assert_eq!(s.state().canvas.background, palette.colors()[0]);
    }

    #[test]
    fn test_set_shapes_clamps_fill_index() {
        let mut s = store();
        let mut shapes = s.state().shapes.clone();
        shapes[0].fill_index = 99;
        s.set_shapes(shapes);
        assert_eq!(s.state().shapes[0].fill_index, 4);
    }

    #[test]
    fn test_empty_palette_ignored() {
        let mut s = store();
        s.set_palette(Palette::default());
        assert!(!s.can_undo());
        assert_eq!(s.state().palette.len(), 5);
    }

    #[test]
    fn test_set_filters_clamps() {
        let mut s = store();
        s.set_filters(FiltersUpdate {
            blur: Some(300.0),
            grain: Some(1.5),
            ..Default::default()
        });
        assert_eq!(s.state().filters.blur, 256.0);
        assert_eq!(s.state().filters.grain, 1.0);
    }

    #[test]
    fn test_set_canvas_clamps() {
        let mut s = store();
        s.set_canvas(CanvasUpdate {
            width: Some(10),
            height: Some(10_000),
        });
        assert_eq!(s.state().canvas.width, 64);
        assert_eq!(s.state().canvas.height, 6000);
    }

    #[test]
    fn test_move_shape_bounds() {
        let mut s = store();
        let ids: Vec<ShapeId> = s.state().shapes.iter().map(|sh| sh.id).collect();
        let last = *ids.last().unwrap();

        assert!(!s.move_shape_up(last));
        assert!(!s.move_shape_down(ids[0]));
        assert!(!s.can_undo());

        assert!(s.move_shape_up(ids[0]));
        assert_eq!(s.state().shapes[1].id, ids[0]);
        assert!(s.move_shape_down(ids[0]));
        assert_eq!(s.state().shapes[0].id, ids[0]);
        assert!(!s.move_shape_up(ShapeId::new()));
    }

    #[test]
    fn test_update_shape() {
        let mut s = store();
        let id = s.state().shapes[2].id;
        assert!(s.update_shape(id, |sh| sh.translated(10.0, 0.0)));
        assert!(s.can_undo());

        let before = json(s.state());
        assert!(!s.update_shape(ShapeId::new(), |sh| sh.translated(1.0, 1.0)));
        assert_eq!(json(s.state()), before);
        assert_eq!(s.history().past_len(), 1);
    }

    #[test]
    fn test_shuffle_colors() {
        let mut a = store();
        let mut b = store();
        a.shuffle_colors_with_nonce(7);
        b.shuffle_colors_with_nonce(7);
        assert_eq!(a.state(), b.state());
        let len = a.state().palette.len();
        assert!(a.state().shapes.iter().all(|sh| sh.fill_index < len));

        // Same palette, repeated shuffles diverge because the history depth changes.
        let first: Vec<usize> = a.state().shapes.iter().map(|s| s.fill_index).collect();
        let mut differs = false;
        for _ in 0..5 {
            a.shuffle_colors_with_nonce(7);
            let next: Vec<usize> = a.state().shapes.iter().map(|s| s.fill_index).collect();
            differs |= next != first;
        }
        assert!(differs);
    }

    #[test]
    fn test_palette_helpers() {
        let mut s = store();
        let id = s.add_color("#abcdef");
        assert_eq!(s.state().palette.len(), 6);
        assert!(s.update_color(id, "#fedcba"));
        assert!(s.move_color(5, 0));
        assert_eq!(s.state().canvas.background.value, "#fedcba");
        assert!(s.remove_color(id));
        assert_eq!(s.state().palette.len(), 5);
        assert!(!s.remove_color(id));
    }

    #[test]
    fn test_remove_last_color_refused() {
        let mut s = store();
        s.set_palette(Palette::from_hex(&["#000000"]));
        let id = s.state().palette.colors()[0].id;
        assert!(!s.remove_color(id));
    }

    #[test]
    fn test_select_shape_not_undoable() {
        let mut s = store();
        let id = s.state().shapes[0].id;
        s.select_shape(Some(id));
        assert_eq!(s.selected_shape().map(|sh| sh.id), Some(id));
        assert!(!s.can_undo());
        s.select_shape(Some(ShapeId::new()));
        assert!(s.selected_shape().is_none());
    }

    #[test]
    fn test_share_roundtrip_replaces_state_and_history() {
        let mut src = store();
        src.randomize(Some("shared"), Some(7));
        src.set_filters(FiltersUpdate {
            grain_enabled: Some(true),
            ..Default::default()
        });
        let encoded = src.to_share_string().unwrap();

        let mut dst = store();
        dst.randomize(Some("local"), None);
        dst.from_share_string(&encoded).unwrap();
        assert!(!dst.can_undo());
        assert_eq!(dst.state().palette, src.state().palette);
        assert_eq!(dst.state().shapes, src.state().shapes);
        assert_eq!(dst.state().filters, src.state().filters);
        assert_eq!(dst.state().canvas, src.state().canvas);
        assert_eq!(dst.state().seed, src.state().seed);
    }

    #[test]
    fn test_bad_share_string_leaves_state() {
        let mut s = store();
        s.randomize(Some("keep"), None);
        let before = json(s.state());
        assert!(s.from_share_string("not a share string").is_err());
        assert_eq!(json(s.state()), before);
        assert!(s.can_undo());
    }

    #[test]
    fn test_share_with_empty_palette_keeps_background() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let mut s = store();
        s.from_share_string(&URL_SAFE_NO_PAD.encode(r#"{"palette":[]}"#))
            .unwrap();
        let palette = &s.state().palette;
        assert!(!palette.is_empty());
        assert_eq!(Some(&s.state().canvas.background), palette.background());
    }

    #[test]
    fn test_non_finite_update_still_shares() {
        let mut s = store();
        let id = s.state().shapes[0].id;
        assert!(s.update_shape(id, |sh| sh.scaled(f64::NAN)));
        assert!(s.state().shapes.iter().all(|sh| sh.points.iter().all(Point::is_finite)));

        let encoded = s.to_share_string().unwrap();
        let mut other = store();
        other.from_share_string(&encoded).unwrap();
        assert_eq!(other.state().shapes, s.state().shapes);
    }

    #[test]
    fn test_set_shapes_drops_non_finite_vertices() {
        let mut s = store();
        let mut shapes = s.state().shapes.clone();
        let kept = shapes[1].points.len() - 1;
        shapes[1].points[0] = Point::new(f64::INFINITY, 3.0);
        s.set_shapes(shapes);
        assert_eq!(s.state().shapes[1].points.len(), kept);
    }

    #[test]
    fn test_fresh_seeds_differ_within_a_millisecond() {
        let mut s = store();
        s.randomize(None, None);
        let first = s.state().seed.clone();
        s.randomize(None, None);
        assert_ne!(s.state().seed, first);
        assert_ne!(fresh_seed(), fresh_seed());
    }

    #[test]
    fn test_with_state_regenerates_empty_shapes() {
        let mut state = MeshState::initial(&Default::default());
        state.shapes.clear();
        let s = MeshStore::with_state(state, StoreConfig::default());
        assert_eq!(s.state().shapes.len(), 6);
        assert!(s.state().shapes[0].points.iter().all(|p: &Point| p.x.is_finite()));
    }

    #[test]
    fn test_share_summary() {
        let s = store();
        let summary = s.share_summary().unwrap();
        assert_eq!(summary.shapes_count, 6);
        assert_eq!(summary.colors_count, 5);
        assert_eq!(summary.share, s.to_share_string().unwrap());
    }
}
