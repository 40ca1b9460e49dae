use std::borrow::Borrow;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::axis::Axis;
use crate::error::MergeError;
use crate::frame::Frame;
use crate::rect::PixelRect;

/// Anything with a pixel size that can be laid out.
pub trait Sizeable {
    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);
}

impl Sizeable for RgbaImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }
}

impl Sizeable for Frame {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl<T: Sizeable + ?Sized> Sizeable for &T {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }
}

/// Which cross-axis size every item is rescaled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossSizePolicy {
    /// Shrink everything to the smallest item; never upscales.
    #[default]
    Smallest,
    /// Grow everything to the largest item; never downscales.
    Largest,
}

/// Resampling filter used when rescaling items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resample {
    Nearest,
    #[default]
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl Resample {
    pub fn filter_type(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Bilinear => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for static compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub axis: Axis,
    pub cross_size: CrossSizePolicy,
    pub filter: Resample,
}

impl Layout {
    pub fn new(axis: Axis) -> Self {
        Self { axis, ..Default::default() }
    }
}

/// Reject items with a zero extent.
pub(crate) fn check_sizes<S: Sizeable>(items: &[S]) -> Result<(), MergeError> {
    for (index, item) in items.iter().enumerate() {
        let (width, height) = item.size();
        if width == 0 || height == 0 {
            return Err(MergeError::DegenerateImage { index, width, height });
        }
    }
    Ok(())
}

/// Compute where each item lands in the composite.
///
/// Items are placed one after another along the main axis, in input order,
/// each rescaled to the common cross size with its aspect ratio preserved.
pub fn plan_layout<S: Sizeable>(items: &[S], layout: &Layout) -> Result<Vec<PixelRect>, MergeError> {
    if items.is_empty() {
        return Err(MergeError::EmptyInput);
    }
    check_sizes(items)?;

    let axis = layout.axis;
    let crosses = items.iter().map(|item| axis.cross(item.size()));
    let target = match layout.cross_size {
        CrossSizePolicy::Smallest => crosses.min(),
        CrossSizePolicy::Largest => crosses.max(),
    }
    .ok_or(MergeError::EmptyInput)?;

    let mut offset = 0;
    let placements = items
        .iter()
        .map(|item| {
            let size = item.size();
            let scaled = axis.main(size) as f64 * target as f64 / axis.cross(size) as f64;
            let main = (scaled.round() as u32).max(1);
            let rect = PixelRect::along(axis, offset, main, target);
            offset += main;
            rect
        })
        .collect();

    Ok(placements)
}

/// Lay out still images side by side into one composite image.
pub fn compose<S: Borrow<RgbaImage>>(images: &[S], layout: &Layout) -> Result<RgbaImage, MergeError> {
    let refs: Vec<&RgbaImage> = images.iter().map(Borrow::<RgbaImage>::borrow).collect();
    let placements = plan_layout(&refs, layout)?;

    let (width, height) = placements
        .last()
        .map(|last| (last.right(), last.bottom()))
        .ok_or(MergeError::EmptyInput)?;
    let mut canvas = RgbaImage::new(width, height);

    for (image, rect) in refs.iter().zip(&placements) {
        if image.dimensions() == rect.size() {
            imageops::replace(&mut canvas, *image, rect.x as i64, rect.y as i64);
        } else {
            let resized = imageops::resize(*image, rect.w, rect.h, layout.filter.filter_type());
            imageops::replace(&mut canvas, &resized, rect.x as i64, rect.y as i64);
        }
    }

    debug!(width, height, items = refs.len(), axis = %layout.axis, "composed frame");
    Ok(canvas)
}
