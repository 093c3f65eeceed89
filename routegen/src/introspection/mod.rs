//! Introspection of a router's route table.

mod route_info;

pub use route_info::RouteInfo;
