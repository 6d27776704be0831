// Reusable library API — visible to the CLI and to integration tests
pub mod consistency;
pub mod domains;
pub mod errors;
pub mod grid;
pub mod log;
pub mod render;
pub mod solver;
pub mod word_list;
