pub mod fixture;
pub mod identity;
pub mod match_result;
pub mod score;
pub mod submission;
