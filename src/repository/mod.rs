//! Repository layer for page lookup and dispatch

pub mod local;
pub mod pages;
pub mod registry;
pub mod routes;
pub mod scope;

pub use local::WorkDirectory;
pub use pages::{DispatchHandle, DispatchProvider, DispatchTarget, PageHandler, PathRepository};
pub use registry::InstanceRegistry;
pub use routes::RouteTable;
pub use scope::ApplicationScope;

/// Start-up hook: create the per-scope registries before the first request
pub fn initialize(scope: &ApplicationScope) {
    PathRepository::<RouteTable>::initialize(scope);
    PathRepository::<WorkDirectory>::initialize(scope);
}
