//! Codec layer: code packing and document layout.

pub mod packer;
pub mod writer;
