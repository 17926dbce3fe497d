// API models - request bodies in, views out

pub mod requests;
pub mod views;

pub use requests::*;
pub use views::*;
