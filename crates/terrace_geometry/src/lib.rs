pub mod params;
pub mod buffers;
pub mod shape;
pub mod fragment;
pub mod sculpt;
pub mod weld;
pub mod terrace;

pub use params::*;
pub use buffers::*;
pub use shape::*;
pub use fragment::*;
pub use sculpt::*;
pub use weld::*;
pub use terrace::*;
