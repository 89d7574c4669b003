// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network code lives here and talks to Burn directly.
//
//   layers.rs     — SeparableConv2d, NodeOp and DagLayer, the
//                   building blocks of a randomly wired stage
//
//   model.rs      — RandWire: stem convs, three DAG stages,
//                   1×1 conv head, pooling, linear classifier,
//                   log-softmax output
//
//   validator.rs  — The no-gradient validation loop and the
//                   Classifier trait it is written against
//
// Reference: Burn Book §3 (Building Blocks)
//            Xie et al. (2019) Randomly Wired Neural Networks

/// Separable convolution, graph node and DAG stage modules
pub mod layers;

/// The RandWire classifier
pub mod model;

/// Validation loop: average NLL loss and accuracy
pub mod validator;
