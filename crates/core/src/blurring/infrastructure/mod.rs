pub mod channel_ops;
pub mod engine_factory;
pub mod halved_scatter_contribution;
pub mod row_parallelizer;
pub mod scatter_contribution;
