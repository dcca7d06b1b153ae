// SPDX-License-Identifier: MIT

//! flowsync - session and workflow cache client for the automation API
//!
//! - [gql] - GraphQL transport, operations and errors
//! - [store] - session and workflow stores with their injected capabilities
//! - [config] - environment-driven client configuration

pub mod config;
pub mod gql;
pub mod store;
