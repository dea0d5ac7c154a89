pub mod exercise;
pub mod meta;
pub mod session;

pub use exercise::{Exercise, ExerciseKind, NewExercise};
pub use meta::MetaEntry;
pub use session::{month_key_for, CardioEntry, Session, SessionExercise, SessionType, SetEntry};
