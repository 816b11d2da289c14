//! Storage adapters for the ACL repository port.

#![forbid(unsafe_code)]

mod in_memory_acl_repository;
mod postgres_acl_repository;

pub use in_memory_acl_repository::InMemoryAclRepository;
pub use postgres_acl_repository::PostgresAclRepository;
