use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a palette entry; survives reorder and edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub Uuid);

impl ColorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ColorId {
    fn default() -> Self {
        Self::new()
    }
}

/// A palette entry: identity plus a hex color string such as `#1f2937`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub value: String,
}

impl Color {
    pub fn new(value: &str) -> Self {
        Self {
            id: ColorId::new(),
            value: value.to_string(),
        }
    }

    pub fn with_id(id: ColorId, value: &str) -> Self {
        Self {
            id,
            value: value.to_string(),
        }
    }
}

/// Ordered colors. Index 0 is the canvas background; the rest fill shapes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Build a palette from hex strings, assigning fresh ids.
    pub fn from_hex<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            colors: values.iter().map(|v| Color::new(v.as_ref())).collect(),
        }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Color> {
        self.colors.get(index)
    }

    pub fn background(&self) -> Option<&Color> {
        self.colors.first()
    }

    pub fn position(&self, id: ColorId) -> Option<usize> {
        self.colors.iter().position(|c| c.id == id)
    }

    /// Largest valid fill index; an empty palette counts as length 1.
    pub fn max_index(&self) -> usize {
        self.colors.len().max(1) - 1
    }

    /// Color used to paint a shape with `fill_index`.
    ///
    /// Fills are drawn from the palette past the background slot, so the shape
    /// color is `palette[fill_index + 1]`, falling back to the background and
    /// then to black.
    pub fn fill_color(&self, fill_index: usize) -> &str {
        fill_index
            .checked_add(1)
            .and_then(|i| self.colors.get(i))
            .or_else(|| self.colors.first())
            .map(|c| c.value.as_str())
            .unwrap_or("#000000")
    }

    pub fn push(&mut self, color: Color) {
        self.colors.push(color);
    }

    pub fn remove(&mut self, id: ColorId) -> Option<Color> {
        let index = self.position(id)?;
        Some(self.colors.remove(index))
    }

    pub fn update(&mut self, id: ColorId, value: &str) -> bool {
        match self.colors.iter_mut().find(|c| c.id == id) {
            Some(color) => {
                color.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Move the entry at `from` to position `to`, shifting the others.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.colors.len() || to >= self.colors.len() {
            return false;
        }
        let color = self.colors.remove(from);
        self.colors.insert(to, color);
        true
    }
}

/// Loose check for `#rgb`, `#rrggbb` and `#rrggbbaa` strings.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
