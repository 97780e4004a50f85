//! # CAT-01 GIF Encoder
//!
//! Encodes a sequence of cell-state frames into an animated GIF89a.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`)
//!   - `Frame`: one rectangle of cell states plus its delay
//!   - `Palette`: global colour table resolved from the rule's state count
//! - **Codec Layer** (`codec/`)
//!   - `CodePacker`: LSB-first variable-width code packing
//!   - `GifEncoder`: document layout and per-frame image data
//!
//! ## Image Data
//!
//! Frames are not LZW-compressed. Every pixel is emitted as a clear code
//! followed by the literal pixel value, so the code table never grows and
//! the code width stays at `bit_width + 1`. Any conformant decoder reads the
//! stream back exactly.
//!
//! ```text
//! clear v0 clear v1 clear v2 ... clear vN end
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use cat_01_gif_encoder::{encode, Frame, Palette};
//! use shared_types::Rect;
//!
//! let palette = Palette::builder(2).build()?;
//! let frame = Frame::new(Rect::new(0, 0, 1, 1), vec![1], 10)?;
//! let gif = encode(Rect::new(0, 0, 1, 1), &palette, &[frame])?;
//! gif.write_to("out.gif")?;
//! ```

pub mod codec;
pub mod domain;
pub mod error;

pub use codec::writer::{encode, GifDocument, GifEncoder};
pub use domain::frame::Frame;
pub use domain::palette::{Palette, PaletteBuilder, BACKGROUND};
pub use error::EncodeError;

/// Largest canvas dimension a GIF can describe.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;
