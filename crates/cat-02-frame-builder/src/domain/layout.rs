//! Canvas and timing of a finished frame sequence.

use shared_types::Rect;

/// Cells of padding around the union of all frames.
pub const CANVAS_MARGIN: u32 = 1;

/// Union of all non-empty frame rectangles, grown by [`CANVAS_MARGIN`].
///
/// Without any live cell the canvas is the 2x2 area around the origin.
pub fn bounding_box<I>(rects: I) -> Rect
where
    I: IntoIterator<Item = Rect>,
{
    rects
        .into_iter()
        .filter(|r| !r.is_empty())
        .reduce(|acc, r| acc.union(&r))
        .unwrap_or(Rect::new(0, 0, 0, 0))
        .expand(CANVAS_MARGIN)
}

/// Delay for frames without an explicit one:
/// `ceil(clamp(4 / frame_count, 0.01, 1) * 100)` hundredths of a second.
pub fn default_delay(frame_count: usize) -> u16 {
    let per_frame = if frame_count == 0 {
        1.0
    } else {
        (4.0 / frame_count as f64).clamp(0.01, 1.0)
    };
    (per_frame * 100.0).ceil() as u16
}

/// Delay for `F fps`: `ceil(100 / F)`, saturating. `None` unless `F > 0`.
pub fn fps_delay(fps: f64) -> Option<u16> {
    if fps > 0.0 && fps.is_finite() {
        Some((100.0 / fps).ceil().min(f64::from(u16::MAX)) as u16)
    } else {
        None
    }
}
