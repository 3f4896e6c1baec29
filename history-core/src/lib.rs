pub mod amount;
pub mod balance;
pub mod batch;
pub mod card;
pub mod classifier;
pub mod event;
pub mod hand;
pub mod metadata;
pub mod parser;
pub mod result;

#[cfg(test)]
mod test_data;
