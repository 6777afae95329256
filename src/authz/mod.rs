//! Role-based authorization
//!
//! A pure decision layer: role grant tables plus instance-level ownership
//! conditions. Consulted by the HTTP handlers before every state change.

mod permission;
mod resolver;

pub use permission::{Action, Condition, Grant, Policy, ResourceKind, ResourceRefs};
pub use resolver::Resolver;
