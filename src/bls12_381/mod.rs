pub mod fp2impl;
pub mod fpimpl;
pub mod fq;
pub mod fq2;
pub mod line_evaluation;
pub mod line_functions;
pub mod utils;
