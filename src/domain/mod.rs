// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the evaluator works with.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only structs, enums and the checks that keep them valid
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

// Which validation set to load, and how its pixels are normalised
pub mod dataset_kind;

// Wiring graphs of the randomly wired stages
pub mod graph;
