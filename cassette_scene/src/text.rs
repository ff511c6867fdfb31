// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement with a bounded, scene-scoped cache.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use cassette_geometry::Vector2D;
use hashbrown::HashMap;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Font weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font description used for text runs and measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Size in pixels.
    pub size: f64,
    /// Weight.
    pub weight: FontWeight,
    /// Family name.
    pub family: String,
}

impl Default for Font {
    fn default() -> Self {
        // 2rem at a 16px root size.
        Self {
            size: 32.0,
            weight: FontWeight::Normal,
            family: String::from("Helvetica"),
        }
    }
}

impl Font {
    /// A font of the default family and weight at `size` pixels.
    pub fn with_size(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Measures the rendered extent of a single line of text.
pub trait TextMeasure {
    /// Width and height of `text` when drawn with `font`.
    fn measure(&self, text: &str, font: &Font) -> Vector2D;
}

/// Approximate measurer: every character advances by a fixed fraction of the font size.
///
/// Results are rounded up to whole pixels, matching layout engines that report integer client
/// sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AverageCharWidth {
    /// Advance per character as a fraction of the font size.
    pub advance: f64,
    /// Line height as a fraction of the font size.
    pub line_height: f64,
}

impl Default for AverageCharWidth {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for AverageCharWidth {
    fn measure(&self, text: &str, font: &Font) -> Vector2D {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Character counts of a single label are far below 2^52."
        )]
        let chars = text.chars().count() as f64;
        let width = (chars * font.size * self.advance).ceil();
        let height = if text.is_empty() {
            0.0
        } else {
            (font.size * self.line_height).ceil()
        };
        Vector2D::new(width, height)
    }
}

/// Cache key: the text plus every font field that affects its extent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextKey {
    text: String,
    size_bits: u64,
    weight: FontWeight,
    family: String,
}

impl TextKey {
    /// Build a key for `text` in `font`.
    pub fn new(text: &str, font: &Font) -> Self {
        Self {
            text: String::from(text),
            size_bits: font.size.to_bits(),
            weight: font.weight,
            family: font.family.clone(),
        }
    }
}

/// Memoizes a [`TextMeasure`].
///
/// The cache holds at most `capacity` entries; inserting into a full cache clears it first.
pub struct TextCache {
    measurer: Box<dyn TextMeasure>,
    entries: HashMap<TextKey, Vector2D>,
    capacity: usize,
}

impl fmt::Debug for TextCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextCache")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new(Box::new(AverageCharWidth::default()), Self::DEFAULT_CAPACITY)
    }
}

impl TextCache {
    /// Default entry limit.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Wrap `measurer` with a cache of at most `capacity` entries.
    pub fn new(measurer: Box<dyn TextMeasure>, capacity: usize) -> Self {
        assert!(capacity > 0, "text cache capacity must be non-zero");
        Self {
            measurer,
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Measure `text`, consulting the cache first.
    pub fn measure(&mut self, text: &str, font: &Font) -> Vector2D {
        let key = TextKey::new(text, font);
        if let Some(size) = self.entries.get(&key) {
            return *size;
        }
        let size = self.measurer.measure(text, font);
        if self.entries.len() >= self.capacity {
            log::debug!("text cache full at {} entries, clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(key, size);
        size
    }

    /// Number of cached measurements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached measurement.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Counting<'a> {
        calls: &'a Cell<u32>,
    }

    impl TextMeasure for Counting<'_> {
        fn measure(&self, text: &str, _font: &Font) -> Vector2D {
            self.calls.set(self.calls.get() + 1);
            #[allow(clippy::cast_precision_loss, reason = "test strings are short")]
            Vector2D::new(text.len() as f64, 10.0)
        }
    }

    #[test]
    fn average_width_scales_with_font() {
        let m = AverageCharWidth::default();
        let small = m.measure("GFP", &Font::with_size(10.0));
        let large = m.measure("GFP", &Font::with_size(20.0));
        assert_eq!(small, Vector2D::new(18.0, 12.0));
        assert_eq!(large, Vector2D::new(36.0, 24.0));
        assert_eq!(m.measure("", &Font::default()), Vector2D::ZERO);
    }

    #[test]
    fn cache_hits_skip_the_measurer() {
        // Leaked so the boxed measurer can borrow it for 'static.
        let calls: &'static Cell<u32> = Box::leak(Box::new(Cell::new(0)));
        let mut cache = TextCache::new(Box::new(Counting { calls }), 8);
        let font = Font::with_size(12.0);
        cache.measure("pTet", &font);
        cache.measure("pTet", &font);
        assert_eq!(calls.get(), 1, "second lookup should be cached");
        cache.measure("pTet", &Font::with_size(14.0));
        assert_eq!(calls.get(), 2, "font size is part of the key");
        let bold = Font {
            weight: FontWeight::Bold,
            ..font.clone()
        };
        cache.measure("pTet", &bold);
        assert_eq!(calls.get(), 3, "weight is part of the key");
    }

    #[test]
    fn full_cache_is_cleared_before_insert() {
        let mut cache = TextCache::new(Box::new(AverageCharWidth::default()), 2);
        let font = Font::default();
        cache.measure("a", &font);
        cache.measure("b", &font);
        assert_eq!(cache.len(), 2);
        cache.measure("c", &font);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
