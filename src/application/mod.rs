// Application layer - Dispatch and detection kernels plus their use cases
pub mod anomaly_service;
pub mod detector;
pub mod dispatch_service;
pub mod dispatcher;
pub mod features;
pub mod isolation_forest;
pub mod roster_repository;
pub mod synthetic;
