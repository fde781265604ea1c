mod permissions;

pub use permissions::{PermissionMiddlewareFactory, PermissionMiddlewareService};
