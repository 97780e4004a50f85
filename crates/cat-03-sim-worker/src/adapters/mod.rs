pub mod gifsicle;

pub use gifsicle::GifsicleResizer;
