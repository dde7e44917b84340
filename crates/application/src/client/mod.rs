//! HTTP plumbing over the platform API.
//!
//! - [`RequestExecutor`]: bearer injection, refresh-and-replay on 401
//! - [`Coalescer`]: one in-flight call per key
//! - [`endpoints`]: backend routes

mod coalescer;
pub mod endpoints;
mod executor;
mod refresh;

pub use coalescer::Coalescer;
pub use executor::RequestExecutor;
