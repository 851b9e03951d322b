pub mod context;
pub mod rpc;
pub mod session;
