//! Award engine library modules.
//!
//! The crate is organised hexagonally: `domain` holds the award pipeline,
//! rule engine, rank structure, and the ports they drive; `outbound` holds
//! adapters implementing those ports. Inbound transports (HTTP, queues with a
//! durable broker) live in embedding applications, not here.

pub mod domain;
pub mod outbound;
