//! PostgreSQL adapter implementations.

mod subscription_repository;

pub use subscription_repository::PostgresSubscriptionRepository;
