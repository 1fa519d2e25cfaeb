pub mod choices;
pub mod missions;
pub mod page;
pub mod price;
pub mod product;
pub mod query;
pub mod review;
pub mod user;
