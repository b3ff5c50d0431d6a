mod banner;
pub use banner::*;
mod dashboard;
pub use dashboard::*;
mod filters;
pub use filters::*;
mod header;
pub use header::*;
mod item;
pub use item::*;
mod upload;
pub use upload::*;
