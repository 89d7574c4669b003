// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches files on behalf of the other layers:
//
//   hparams.rs       — YAML configuration → HParams
//
//   graph_reader.rs  — wiring graph text files → domain Graph
//
//   checkpoint.rs    — Burn record holding model weights and the
//                      training step; restores them into RandWire
//
//   metrics.rs       — optional CSV log of evaluation results
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Configuration file loading
pub mod hparams;

/// Graph description reader
pub mod graph_reader;

/// Model checkpoint loading
pub mod checkpoint;

/// Evaluation metrics CSV logger
pub mod metrics;
