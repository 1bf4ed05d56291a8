pub mod flock_service;

pub use flock_service::FlockService;
