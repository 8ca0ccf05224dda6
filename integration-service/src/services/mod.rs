pub mod hubspot;
pub mod oauth;
pub mod store;

pub use hubspot::HubSpotClient;
pub use oauth::OAuthFlow;
pub use store::{KeyValueStore, MemoryStore, RedisStore};
