//! Precision describers: how large the simulated contact area is.

use std::fmt;
use std::sync::Arc;

use crate::event::Precision;

const MM_PER_INCH: f32 = 25.4;

/// Describes the precision of a touch.
pub trait PrecisionDescriber: fmt::Debug + Send + Sync {
    fn describe_precision(&self) -> Precision;
}

/// A fixed precision.
impl PrecisionDescriber for Precision {
    fn describe_precision(&self) -> Precision {
        *self
    }
}

impl<P: PrecisionDescriber + ?Sized> PrecisionDescriber for Arc<P> {
    fn describe_precision(&self) -> Precision {
        (**self).describe_precision()
    }
}

/// Physical contact tools, sized in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// A stylus tip, about 1 mm.
    Pinpoint,
    /// A fingertip, about 16 mm.
    Finger,
    /// A thumb, about 25 mm.
    Thumb,
}

impl Press {
    /// Contact size in millimetres.
    pub fn millimetres(self) -> f32 {
        match self {
            Press::Pinpoint => 1.0,
            Press::Finger => 16.0,
            Press::Thumb => 25.0,
        }
    }

    /// The same contact converted to pixels for a display density.
    pub fn at_density(self, xdpi: f32, ydpi: f32) -> DensityScaledPress {
        DensityScaledPress {
            press: self,
            xdpi,
            ydpi,
        }
    }
}

impl PrecisionDescriber for Press {
    fn describe_precision(&self) -> Precision {
        let mm = self.millimetres();
        Precision::new(mm, mm)
    }
}

/// A [`Press`] expressed in pixels of a particular display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityScaledPress {
    press: Press,
    xdpi: f32,
    ydpi: f32,
}

impl PrecisionDescriber for DensityScaledPress {
    fn describe_precision(&self) -> Precision {
        let mm = self.press.millimetres();
        Precision::new(mm * self.xdpi / MM_PER_INCH, mm * self.ydpi / MM_PER_INCH)
    }
}
