pub mod prompt;
pub mod transcript;

pub use transcript::Transcript;
