pub mod demo;
pub mod detect;
pub mod init;
pub mod paste;

pub use demo::{demo, DemoArgs};
pub use detect::{detect, DetectArgs};
pub use init::{init, InitArgs};
pub use paste::{paste, PasteArgs};
