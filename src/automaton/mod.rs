pub mod build;
pub mod dfa;
pub mod driver;
pub mod guard;

pub use dfa::Dfa;
pub use driver::{AutomatonDriver, PlanStep};
pub use guard::{Bit, Guard, Sog};
