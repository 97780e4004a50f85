//! GIF89a document layout.
//!
//! ```text
//! "GIF89a"
//! logical screen descriptor   w h flags(0xF0 | b-1) bg=0 aspect=0
//! global colour table         2^b entries
//! NETSCAPE2.0 extension       loop forever
//! per frame:
//!   graphic control ext       21 F9 04 00 delay FF 00
//!   image descriptor          2C 0 0 w h 00 (full canvas, no local table)
//!   min code size b, sub-blocks, 00
//! trailer 3B
//! ```

use crate::codec::packer::{write_sub_blocks, CodePacker};
use crate::domain::frame::Frame;
use crate::domain::palette::Palette;
use crate::error::EncodeError;
use crate::MAX_DIMENSION;
use shared_types::Rect;
use std::io;
use std::path::Path;
use tracing::debug;

const SIGNATURE: &[u8; 6] = b"GIF89a";

const NETSCAPE_LOOP: [u8; 19] = [
    0x21, 0xFF, 0x0B, b'N', b'E', b'T', b'S', b'C', b'A', b'P', b'E', b'2', b'.', b'0', 0x03,
    0x01, 0x00, 0x00, 0x00,
];

const TRAILER: u8 = 0x3B;

/// Encoded GIF bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifDocument {
    bytes: Vec<u8>,
}

impl GifDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Encoder for one canvas and palette.
#[derive(Debug)]
pub struct GifEncoder<'a> {
    canvas: Rect,
    palette: &'a Palette,
}

impl<'a> GifEncoder<'a> {
    /// `canvas` is the cell-space area every frame is letterboxed onto.
    pub fn new(canvas: Rect, palette: &'a Palette) -> Result<Self, EncodeError> {
        if canvas.is_empty() {
            return Err(EncodeError::EmptyCanvas);
        }
        if canvas.width > MAX_DIMENSION || canvas.height > MAX_DIMENSION {
            return Err(EncodeError::CanvasTooLarge {
                width: canvas.width,
                height: canvas.height,
            });
        }
        Ok(Self { canvas, palette })
    }

    pub fn encode(&self, frames: &[Frame]) -> Result<GifDocument, EncodeError> {
        if frames.is_empty() {
            return Err(EncodeError::NoFrames);
        }
        let mut out = Vec::with_capacity(self.estimated_len(frames.len()));
        self.write_header(&mut out);
        for frame in frames {
            self.write_frame(&mut out, frame)?;
        }
        out.push(TRAILER);

        debug!(
            frames = frames.len(),
            width = self.canvas.width,
            height = self.canvas.height,
            bytes = out.len(),
            "Encoded GIF"
        );
        Ok(GifDocument { bytes: out })
    }

    fn estimated_len(&self, frames: usize) -> usize {
        let codes = self.canvas.area() * 2 + 1;
        let data = codes * usize::from(self.palette.code_width()) / 8 + 1;
        let per_frame = 8 + 10 + 1 + data + data / 255 + 2;
        13 + self.palette.len() * 3 + NETSCAPE_LOOP.len() + per_frame * frames + 1
    }

    fn write_header(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(SIGNATURE);
        push_u16(out, self.canvas.width as u16);
        push_u16(out, self.canvas.height as u16);
        out.push(self.palette.screen_flags());
        out.push(0x00);
        out.push(0x00);
        for entry in self.palette.entries() {
            out.extend_from_slice(&entry.to_bytes());
        }
        out.extend_from_slice(&NETSCAPE_LOOP);
    }

    fn write_frame(&self, out: &mut Vec<u8>, frame: &Frame) -> Result<(), EncodeError> {
        // Graphic control extension
        out.extend_from_slice(&[0x21, 0xF9, 0x04, 0x00]);
        push_u16(out, frame.delay());
        out.extend_from_slice(&[0xFF, 0x00]);

        // Image descriptor
        out.extend_from_slice(&[0x2C, 0x00, 0x00, 0x00, 0x00]);
        push_u16(out, self.canvas.width as u16);
        push_u16(out, self.canvas.height as u16);
        out.push(0x00);

        out.push(self.palette.bit_width());
        let data = self.image_data(frame)?;
        write_sub_blocks(out, &data);
        Ok(())
    }

    fn image_data(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        let clear = self.palette.clear_code();
        let colors = self.palette.len();
        let mut packer =
            CodePacker::with_capacity(self.palette.code_width(), self.canvas.area() * 2 + 1);
        for y in self.canvas.y..self.canvas.bottom() {
            for x in self.canvas.x..self.canvas.right() {
                let value = frame.pixel_at(x, y);
                if usize::from(value) >= colors {
                    return Err(EncodeError::PixelOutOfPalette { value, colors });
                }
                packer.push(clear);
                packer.push(u16::from(value));
            }
        }
        packer.push(self.palette.end_code());
        Ok(packer.finish())
    }
}

/// Encode `frames` onto `canvas` with `palette`.
pub fn encode(canvas: Rect, palette: &Palette, frames: &[Frame]) -> Result<GifDocument, EncodeError> {
    GifEncoder::new(canvas, palette)?.encode(frames)
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::palette::BACKGROUND;

    fn one_pixel(value: u8, delay: u16) -> Frame {
        Frame::new(Rect::new(0, 0, 1, 1), vec![value], delay).unwrap()
    }

    #[test]
    fn test_single_pixel_two_state_bytes() {
        let palette = Palette::builder(2).build().unwrap();
        let gif = encode(Rect::new(0, 0, 1, 1), &palette, &[one_pixel(0, 10)]).unwrap();
        let parts: [&[u8]; 8] = [
            &b"GIF89a"[..],
            // screen descriptor
            &[0x01, 0x00, 0x01, 0x00, 0xF1, 0x00, 0x00],
            // colour table
            &[0x36, 0x39, 0x3E, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            &NETSCAPE_LOOP,
            // graphic control
            &[0x21, 0xF9, 0x04, 0x00, 0x0A, 0x00, 0xFF, 0x00],
            // image descriptor
            &[0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00],
            // min code size, one sub-block of clear(4) 0 end(5), terminator
            &[0x02, 0x02, 0x44, 0x01, 0x00],
            &[0x3B],
        ];
        assert_eq!(gif.as_bytes(), parts.concat().as_slice());
    }

    #[test]
    fn test_single_live_pixel_data() {
        let palette = Palette::builder(2).build().unwrap();
        let gif = encode(Rect::new(0, 0, 1, 1), &palette, &[one_pixel(1, 10)]).unwrap();
        let bytes = gif.as_bytes();
        // clear(4) | 1 << 3 | end(5) << 6 = 0b1_0100_1100
        assert_eq!(&bytes[bytes.len() - 5..], &[0x02, 0x4C, 0x01, 0x00, 0x3B]);
    }

    #[test]
    fn test_letterboxing_pads_with_background() {
        let palette = Palette::builder(2).build().unwrap();
        let frame = Frame::new(Rect::new(1, 0, 1, 1), vec![1], 1).unwrap();
        let encoder = GifEncoder::new(Rect::new(0, 0, 2, 1), &palette).unwrap();
        let data = encoder.image_data(&frame).unwrap();

        let mut expected = CodePacker::new(3);
        for code in [4, 0, 4, 1, 5] {
            expected.push(code);
        }
        assert_eq!(data, expected.finish());
    }

    #[test]
    fn test_large_frame_is_chunked() {
        let palette = Palette::builder(2).build().unwrap();
        let canvas = Rect::new(0, 0, 40, 40);
        let frame = Frame::new(canvas, vec![1; 1600], 4).unwrap();
        let encoder = GifEncoder::new(canvas, &palette).unwrap();
        let data = encoder.image_data(&frame).unwrap();
        // 3201 codes of 3 bits
        assert_eq!(data.len(), (3201 * 3 + 7) / 8);

        let gif = encoder.encode(&[frame]).unwrap();
        let bytes = gif.as_bytes();
        let header_len = 13 + 12 + NETSCAPE_LOOP.len() + 8 + 10 + 1;
        assert_eq!(bytes[header_len], 255);
        assert_eq!(bytes[header_len + 256], 255);
    }

    #[test]
    fn test_errors() {
        let palette = Palette::builder(2).build().unwrap();
        assert_eq!(
            encode(Rect::new(0, 0, 1, 1), &palette, &[]),
            Err(EncodeError::NoFrames)
        );
        assert_eq!(
            encode(Rect::new(0, 0, 0, 1), &palette, &[Frame::empty(1)]),
            Err(EncodeError::EmptyCanvas)
        );
        assert!(matches!(
            encode(Rect::new(0, 0, 70_000, 1), &palette, &[Frame::empty(1)]),
            Err(EncodeError::CanvasTooLarge { .. })
        ));
        assert_eq!(
            encode(Rect::new(0, 0, 1, 1), &palette, &[one_pixel(4, 1)]),
            Err(EncodeError::PixelOutOfPalette {
                value: 4,
                colors: 4
            })
        );
    }

    #[test]
    fn test_standard_decoder_reads_frames() {
        let palette = Palette::builder(3).build().unwrap();
        let canvas = Rect::new(0, 0, 3, 2);
        let frames = [
            Frame::new(canvas, vec![0, 1, 2, 2, 1, 0], 7).unwrap(),
            Frame::new(Rect::new(1, 1, 1, 1), vec![1], 20).unwrap(),
        ];
        let gif = encode(canvas, &palette, &frames).unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options.read_info(gif.as_bytes()).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (3, 2));

        let mut decoded = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            decoded.push((frame.delay, frame.buffer.to_vec()));
        }
        assert_eq!(
            decoded,
            vec![(7, vec![0, 1, 2, 2, 1, 0]), (20, vec![0, 0, 0, 0, 1, 0])]
        );
    }

    #[test]
    fn test_single_pixel_decodes_to_palette_colours() {
        let palette = Palette::builder(2).build().unwrap();
        let canvas = Rect::new(0, 0, 1, 1);

        let decode = |frames: &[Frame]| {
            let gif = encode(canvas, &palette, frames).unwrap();
            let mut options = gif::DecodeOptions::new();
            options.set_color_output(gif::ColorOutput::RGBA);
            let mut decoder = options.read_info(gif.as_bytes()).unwrap();
            let mut pixels = Vec::new();
            while let Some(frame) = decoder.read_next_frame().unwrap() {
                pixels.push(frame.buffer.to_vec());
            }
            pixels
        };

        let dead = decode(&[one_pixel(0, 10)]);
        assert_eq!(dead, vec![vec![BACKGROUND.r, BACKGROUND.g, BACKGROUND.b, 0xFF]]);

        let both = decode(&[one_pixel(0, 10), one_pixel(1, 10)]);
        assert_eq!(both.len(), 2);
        assert_eq!(both[0], dead[0]);
        assert_ne!(both[1], both[0]);
        let live = palette.entries()[1];
        assert_eq!(both[1], vec![live.r, live.g, live.b, 0xFF]);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let palette = Palette::builder(2).build().unwrap();
        let gif = encode(Rect::new(0, 0, 1, 1), &palette, &[one_pixel(1, 5)]).unwrap();
        gif.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), gif.as_bytes());
    }
}
