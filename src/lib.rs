pub mod auth;
pub mod drawer;
pub mod error;
pub mod integration;
pub mod message;
mod result;
pub mod state;
pub mod thread;
pub mod user;

pub use error::Error;
pub use result::Result;

pub trait Raw {
    fn raw(&self) -> &str;
}

pub trait Redact: Raw {
    fn redact(&self) -> String {
        let chars = self.raw().chars().collect::<Vec<_>>();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }

        let head = chars[..4].iter().collect::<String>();
        let tail = chars[chars.len() - 4..].iter().collect::<String>();
        format!("{head}...{tail}")
    }
}
