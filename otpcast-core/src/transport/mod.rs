pub mod gateway;
pub mod registry;
pub mod traits;

pub use gateway::HttpGatewayTransport;
pub use registry::SessionRegistry;
pub use traits::ChatTransport;

#[cfg(test)]
pub use traits::MockChatTransport;
