//! Main-axis / cross-axis abstraction.

use crate::adapter::ItemHolder;
use crate::model::{Orientation, Size};

/// Maps main/cross-axis quantities onto a holder's left/top/width/height.
///
/// Vertical lists scroll along `top`/`height`; horizontal lists along
/// `left`/`width`. Every layout computation goes through this helper so
/// the layout managers never branch on orientation themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOrientationHelper {
    orientation: Orientation,
}

impl ListOrientationHelper {
    /// Create a helper for the given orientation.
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    /// The wrapped orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the main axis is vertical.
    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    /// Main-axis component of `size`.
    pub fn main_of(&self, size: Size) -> f32 {
        match self.orientation {
            Orientation::Vertical => size.height,
            Orientation::Horizontal => size.width,
        }
    }

    /// Cross-axis component of `size`.
    pub fn cross_of(&self, size: Size) -> f32 {
        match self.orientation {
            Orientation::Vertical => size.width,
            Orientation::Horizontal => size.height,
        }
    }

    /// Main-axis start of the holder's frame.
    pub fn decorated_start(&self, holder: &ItemHolder) -> f32 {
        match self.orientation {
            Orientation::Vertical => holder.top(),
            Orientation::Horizontal => holder.left(),
        }
    }

    /// Main-axis end of the holder's frame.
    pub fn decorated_end(&self, holder: &ItemHolder) -> f32 {
        self.decorated_start(holder) + self.decorated_measurement(holder)
    }

    /// Main-axis extent of the holder's frame.
    pub fn decorated_measurement(&self, holder: &ItemHolder) -> f32 {
        match self.orientation {
            Orientation::Vertical => holder.height(),
            Orientation::Horizontal => holder.width(),
        }
    }

    /// Cross-axis start of the holder's frame.
    pub fn decorated_cross_start(&self, holder: &ItemHolder) -> f32 {
        match self.orientation {
            Orientation::Vertical => holder.left(),
            Orientation::Horizontal => holder.top(),
        }
    }

    /// Cross-axis extent of the holder's frame.
    pub fn decorated_measurement_in_other(&self, holder: &ItemHolder) -> f32 {
        match self.orientation {
            Orientation::Vertical => holder.width(),
            Orientation::Horizontal => holder.height(),
        }
    }

    /// Place the holder's frame from main/cross-axis coordinates.
    pub fn set_frame(
        &self,
        holder: &mut ItemHolder,
        main_start: f32,
        main_size: f32,
        cross_start: f32,
        cross_size: f32,
    ) {
        match self.orientation {
            Orientation::Vertical => holder.set_frame(cross_start, main_start, cross_size, main_size),
            Orientation::Horizontal => {
                holder.set_frame(main_start, cross_start, main_size, cross_size)
            }
        }
    }

    /// Viewport extent along the main axis.
    pub fn measurement(&self, viewport: Size) -> f32 {
        self.main_of(viewport)
    }

    /// Viewport extent along the cross axis.
    pub fn measurement_in_other(&self, viewport: Size) -> f32 {
        self.cross_of(viewport)
    }
}
