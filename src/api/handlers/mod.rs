pub mod bids;
pub mod health;
pub mod products;
pub mod token;
pub mod users;
