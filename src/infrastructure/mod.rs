pub mod arcade;
pub mod http;
pub mod model;
