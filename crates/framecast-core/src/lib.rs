pub mod consts;
pub mod encode;
pub mod error;
pub mod frame;
pub mod io;
pub mod normalize;
pub mod paths;
pub mod pipeline;
