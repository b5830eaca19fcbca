pub mod cache;
pub mod memory;
pub mod redis;

mod macros;

pub use cache::Cache;
pub use cache::CacheKey;
pub use cache::CacheStore;
pub use memory::MemoryStore;
pub use self::redis::create_redis_client;
pub use self::redis::RedisStore;
