pub mod operation;

pub use operation::{Operation, OperationGradients, OperationTape, ParameterRole};
