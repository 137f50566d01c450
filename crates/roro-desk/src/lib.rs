pub mod command;
pub mod error;
pub mod render;
pub mod session;

pub use command::Command;
pub use error::DeskError;
pub use session::{DeskSession, FetchedSeries};
