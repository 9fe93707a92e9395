//! Line diff (Myers' algorithm)

pub mod diff_algorithm;
