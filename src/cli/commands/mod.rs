pub mod entities;
pub mod migrate;
pub mod serve;
pub mod token;
