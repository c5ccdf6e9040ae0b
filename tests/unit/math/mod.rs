pub mod probability;
