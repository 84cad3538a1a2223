pub mod check;

pub use check::check_state_invariants;
