pub mod sampler;

pub use sampler::FunctionSampler;
