pub mod filter;
pub mod outcome;
pub mod pool;
pub mod sampler;
pub mod scores;
pub mod weight;
