//! Repository layer: zero-sized structs with async methods that take a
//! [`Db`](crate::Db) handle.

pub mod movie_repo;
pub mod permission_repo;
pub mod token_repo;
pub mod user_repo;

pub use movie_repo::MovieRepo;
pub use permission_repo::PermissionRepo;
pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
