//! Building blocks of the network
//!
//! The affine map and batch normalization are expressed as pure functions over whole
//! batches. Parameters are passed in, gradients are returned, and the network decides
//! when to apply them.

pub mod batchnorm;
pub mod dense;

pub use batchnorm::{
    batchnorm_backward, batchnorm_forward, batchnorm_inference, BatchNormCache, BatchNormGrads,
    BN_EPSILON,
};
pub use dense::{affine, affine_input_grad, affine_param_grads, AffineGrads};
