pub mod close;
pub mod common;
pub mod dispatch;
pub mod merge;
pub mod migrate;
