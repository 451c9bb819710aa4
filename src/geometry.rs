//! Display-strip geometry snapshots shared by the fitter and the coordinator.
//!
//! All widths are terminal display cells. The host rebuilds the snapshot on
//! rotation or configuration change; the fitter and scroll engine only read it.

/// Clearance kept on each side of the cutout hole, in cells.
pub(crate) const HOLE_CLEARANCE: usize = 2;

/// Strip orientation. Cutout bounds are stored per orientation because the
/// hole lands in a different place relative to the strip in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Snapshot of the rendering strip the ticker draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoutGeometry {
    pub orientation: Orientation,
    /// Curved panel. Pagination is only engaged on curved panels.
    pub curved: bool,
    /// The cutout sits in the middle of the strip rather than a corner.
    pub center_cutout: bool,
    /// Cutout edges in portrait, as columns from the strip's left edge.
    pub portrait_cutout: (usize, usize),
    /// Cutout edges in landscape. Curved panels report `(0, 0)` here: the
    /// hole does not intersect the strip when rotated.
    pub landscape_cutout: (usize, usize),
    pub portrait_width: usize,
    pub landscape_width: usize,
    pub left_padding: usize,
}

/// Effective bounds handed to the content fitter. Signed because the icon
/// width and clearance can push a bound past the strip's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitBounds {
    /// Usable width left of the hole.
    pub hole_left: isize,
    /// Column where content may resume right of the hole.
    pub hole_right: isize,
    /// Total usable strip width.
    pub strip: isize,
}

impl CutoutGeometry {
    /// A flat strip with no cutout. The fitter treats this as one
    /// contiguous span and the scroll engine handles any overflow.
    #[must_use]
    pub fn flat(width: usize) -> Self {
        Self {
            orientation: Orientation::Portrait,
            curved: false,
            center_cutout: false,
            portrait_cutout: (0, 0),
            landscape_cutout: (0, 0),
            portrait_width: width,
            landscape_width: width,
            left_padding: 0,
        }
    }

    /// A curved portrait strip with a centered hole spanning
    /// `hole_left..hole_right`.
    #[must_use]
    pub fn curved_portrait(width: usize, hole_left: usize, hole_right: usize) -> Self {
        Self {
            orientation: Orientation::Portrait,
            curved: true,
            center_cutout: true,
            portrait_cutout: (hole_left, hole_right),
            landscape_cutout: (0, 0),
            portrait_width: width,
            landscape_width: width,
            left_padding: 0,
        }
    }

    /// Whether content must be paginated around the hole. Anything else is a
    /// single contiguous span fed straight to the scroll engine.
    #[must_use]
    pub fn paginates(&self) -> bool {
        self.curved && self.center_cutout
    }

    /// Usable strip width for the current orientation.
    #[must_use]
    pub fn strip_width(&self) -> usize {
        match self.orientation {
            Orientation::Portrait => self.portrait_width,
            Orientation::Landscape => self.landscape_width,
        }
    }

    /// Resolve the fitter bounds for the current orientation, reduced by the
    /// icon width and the hole clearance.
    #[must_use]
    pub fn fit_bounds(&self, icon_width: usize) -> FitBounds {
        let (cut_left, cut_right, width) = match self.orientation {
            Orientation::Portrait => {
                let (l, r) = self.portrait_cutout;
                (l, r, self.portrait_width)
            }
            Orientation::Landscape => {
                let (l, r) = self.landscape_cutout;
                (l, r, self.landscape_width)
            }
        };
        let icon = icon_width as isize;
        let clearance = HOLE_CLEARANCE as isize;
        FitBounds {
            hole_left: cut_left as isize - icon - clearance,
            hole_right: cut_right as isize - icon + clearance,
            strip: width as isize - icon,
        }
    }
}
