//! Cutout-aware content fitter.
//!
//! Walks the text one character at a time, filling the span left of the
//! cutout hole, bridging the hole with filler cells, then filling the span
//! right of it. Content that cannot fit the strip is carried over as a
//! continuation fragment shown after the dwell time. Only engaged on curved
//! panels with a centered cutout; everything else is one contiguous span.

use tracing::warn;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::geometry::CutoutGeometry;

/// Cell used to bridge the hole. Space-like so the gap reads as empty.
const FILLER_CELL: char = ' ';

/// Cap on the filler search. Termination guard for edge-case bounds; when it
/// trips the fitter emits what was accumulated and moves on.
const FILLER_SEARCH_MAX: usize = 10;

/// One fitted fragment plus whatever did not fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitting {
    /// Text to hand to the lane, filler included.
    pub display: String,
    /// Bytes of the input consumed by this fragment.
    pub consumed: usize,
    /// Unconsumed suffix, to be fitted again after the dwell time.
    pub remainder: Option<String>,
    /// Number of synthesized filler cells inside `display`.
    pub filler_cells: usize,
}

/// Measured display width of `text` in cells.
#[must_use]
pub fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Fit `text` into the strip described by `geometry`, leaving a gap for the
/// cutout hole. `icon_width` is 0 when the icon is hidden, which simply
/// enlarges both spans. Pure: repeated calls with the same inputs return the
/// same fragments.
#[must_use]
pub fn fit_content(text: &str, icon_width: usize, geometry: &CutoutGeometry) -> Fitting {
    if !geometry.paginates() {
        return Fitting {
            display: text.to_string(),
            consumed: text.len(),
            remainder: None,
            filler_cells: 0,
        };
    }

    let bounds = geometry.fit_bounds(icon_width);
    let mut display = String::new();
    let mut width: isize = 0;
    let mut left_full = false;
    let mut filler_cells = 0usize;

    for (idx, ch) in text.char_indices() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0) as isize;

        if !left_full {
            if width + ch_width < bounds.hole_left {
                display.push(ch);
                width += ch_width;
                continue;
            }
            // This character would run into the hole: close the left span
            // and bridge the gap before placing it.
            left_full = true;
            let mut search = FILLER_SEARCH_MAX;
            while width < bounds.hole_right {
                if search == 0 {
                    warn!(
                        target: "tickerlane::fitter",
                        hole_right = bounds.hole_right,
                        reached = width,
                        "filler search cap hit, emitting accumulated content"
                    );
                    break;
                }
                display.push(FILLER_CELL);
                width += 1;
                filler_cells += 1;
                search -= 1;
            }
        }

        if width + ch_width > bounds.strip {
            // Does not fit this fragment; the suffix becomes a continuation.
            return Fitting {
                display,
                consumed: idx,
                remainder: Some(text[idx..].to_string()),
                filler_cells,
            };
        }
        display.push(ch);
        width += ch_width;
    }

    Fitting {
        display,
        consumed: text.len(),
        remainder: None,
        filler_cells,
    }
}
