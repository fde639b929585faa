//! 结果输出端口的具体实现

mod file;
mod log;

pub use file::JsonFileSink;
pub use log::LogSink;
