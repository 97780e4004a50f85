//! Parser for external renderer output.
//!
//! ```text
//! 12,-3          offset of the next frame (first one wins)
//! 2o$obo!        a frame, as an RLE body
//! @COLOR         everything after this is a colour line
//! 1 255 0 0      state r g b
//! ```

use crate::error::RendererError;
use crate::ports::{RenderedFrames, RendererMode};
use cat_01_gif_encoder::Frame;
use shared_types::{Rect, Rgb};
use sim_engine::rle;

const COLOR_MARKER: &str = "@COLOR";

/// Parse renderer output into frames and colours.
///
/// In [`RendererMode::Viewer`] offsets are shifted by -1 and the first frame
/// (a copy of the input) is dropped.
pub fn parse_renderer_output(
    text: &str,
    mode: RendererMode,
) -> Result<RenderedFrames, RendererError> {
    let mut out = RenderedFrames::default();
    let mut offset: Option<(i64, i64)> = None;
    let mut in_colors = false;
    let mut skipped_first = false;

    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.contains(',') {
            if offset.is_none() {
                offset = Some(parse_offset(line)?);
            }
        } else if in_colors {
            let (state, color) = parse_color(line)?;
            out.colors.insert(state, color);
        } else if line == COLOR_MARKER {
            in_colors = true;
        } else {
            let (mut x, mut y) = offset.take().unwrap_or((0, 0));
            if mode == RendererMode::Viewer {
                x -= 1;
                y -= 1;
                if !skipped_first {
                    skipped_first = true;
                    continue;
                }
            }
            out.frames.push(frame_from_body(line, x, y)?);
        }
    }
    Ok(out)
}

fn parse_offset(line: &str) -> Result<(i64, i64), RendererError> {
    let malformed = || RendererError::MalformedOutput(format!("bad offset line `{line}`"));
    let mut fields = line.split(',').map(|f| f.trim().parse::<i64>());
    match (fields.next(), fields.next()) {
        (Some(Ok(x)), Some(Ok(y))) => Ok((x, y)),
        _ => Err(malformed()),
    }
}

fn parse_color(line: &str) -> Result<(u8, Rgb), RendererError> {
    let values: Vec<u8> = line
        .split_whitespace()
        .map(|v| v.parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| RendererError::MalformedOutput(format!("bad colour line `{line}`")))?;
    match values.as_slice() {
        [state, r, g, b, ..] => Ok((*state, Rgb::new(*r, *g, *b))),
        _ => Err(RendererError::MalformedOutput(format!(
            "bad colour line `{line}`"
        ))),
    }
}

/// Build a frame whose grid starts at `(x, y)` from an RLE body.
fn frame_from_body(body: &str, x: i64, y: i64) -> Result<Frame, RendererError> {
    let cells =
        rle::parse_body(body).map_err(|e| RendererError::MalformedOutput(e.to_string()))?;
    let Some(width) = cells.iter().map(|c| c.x + 1).max() else {
        return Ok(Frame::empty(0).translated(x, y));
    };
    let height = cells.iter().map(|c| c.y + 1).max().unwrap_or(0);
    let rect = Rect::from_edges(x, y, x + width, y + height);
    let mut pixels = vec![0u8; rect.area()];
    for cell in &cells {
        pixels[cell.y as usize * rect.width as usize + cell.x as usize] = cell.state;
    }
    Frame::new(rect, pixels, 0).map_err(|e| RendererError::MalformedOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_loader_output() {
        let text = "5,7\n2o$obo!\n\n3o!\n";
        let out = parse_renderer_output(text, RendererMode::RuleLoader).unwrap();
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.frames[0].rect(), Rect::new(5, 7, 3, 2));
        assert_eq!(out.frames[0].pixels(), &[1, 1, 0, 1, 0, 1]);
        // Offset was consumed by the first frame.
        assert_eq!(out.frames[1].rect(), Rect::new(0, 0, 3, 1));
        assert!(out.colors.is_empty());
    }

    #[test]
    fn test_first_offset_wins() {
        let text = "1,1\n9,9\no!\n";
        let out = parse_renderer_output(text, RendererMode::RuleLoader).unwrap();
        assert_eq!(out.frames[0].rect().x, 1);
        assert_eq!(out.frames[0].rect().y, 1);
    }

    #[test]
    fn test_viewer_mode_shifts_and_skips_first() {
        let text = "0,0\no!\n3,4\n2o!\n";
        let out = parse_renderer_output(text, RendererMode::Viewer).unwrap();
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].rect(), Rect::new(2, 3, 2, 1));
    }

    #[test]
    fn test_colors_section() {
        let text = "o!\n@COLOR\n1 255 0 0\n2 0 0 255\n";
        let out = parse_renderer_output(text, RendererMode::RuleLoader).unwrap();
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.colors.get(&1), Some(&Rgb::new(255, 0, 0)));
        assert_eq!(out.colors.get(&2), Some(&Rgb::new(0, 0, 255)));
    }

    #[test]
    fn test_multistate_body() {
        let out = parse_renderer_output("A.C!", RendererMode::RuleLoader).unwrap();
        assert_eq!(out.frames[0].pixels(), &[1, 0, 3]);
    }

    #[test]
    fn test_empty_frame_body() {
        let out = parse_renderer_output("2,2\n3b!\n", RendererMode::RuleLoader).unwrap();
        assert!(out.frames[0].is_empty());
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse_renderer_output("a,b\n", RendererMode::RuleLoader),
            Err(RendererError::MalformedOutput(_))
        ));
        assert!(parse_renderer_output("@COLOR\n1 2\n", RendererMode::RuleLoader).is_err());
        assert!(parse_renderer_output("3%!\n", RendererMode::RuleLoader).is_err());
    }
}
