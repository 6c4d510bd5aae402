//! Application layer: ports the infrastructure adapters implement
//! against, and the use cases that compose them into the pipeline's
//! task lifecycle. No concrete I/O library appears here.
pub mod ports;
pub mod use_cases;
