pub mod browser;

pub use browser::ChromeProvider;
