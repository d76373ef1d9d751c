pub mod flashcard;
pub mod review;

pub use flashcard::StudentFlashcard;
pub use review::{Difficulty, PendingFlashcardUpdate, ReviewedResult};
