//! HTTP clients for the two external services this storefront fronts.

pub mod commerce;
pub mod gateway;

pub use commerce::CommerceClient;
pub use gateway::GatewayClient;
