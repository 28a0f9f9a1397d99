pub mod graphql;
pub mod repositories;
