pub mod assembler;
pub mod numeric;
pub mod records;
pub mod valuation;

pub use assembler::assemble;
pub use records::FaasInputs;
pub use valuation::{compute, BaseValuePolicy};
