pub mod deploy;
pub mod export;
pub mod preview;
pub mod template;
