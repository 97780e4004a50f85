pub mod executor;

pub use executor::{base_gif_name, final_gif_name, TaskExecutor};
