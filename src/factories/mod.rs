pub mod engine_factory;
