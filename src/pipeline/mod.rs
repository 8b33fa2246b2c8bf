pub mod assign;
pub mod detect;
pub mod extract;
pub mod generate;
