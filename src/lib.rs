pub mod analysis;
pub mod filter;
pub mod output;
pub mod record;
