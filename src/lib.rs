use shadow_rs::shadow;

shadow!(build);

// Search space and problems
// -------------------------
pub mod problem;
pub mod search;
pub mod space;

// Internals
// ---------
pub mod data_structures;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;
