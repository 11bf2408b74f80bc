pub mod health_route;
pub mod invocations;
pub mod webhook;
