pub mod platform;
pub mod render;
pub mod sink;

pub use platform::{PageState, PlatformAdapter};
pub use render::{RenderPage, RenderSession, SessionProvider, close_page};
pub use sink::ResultSink;
