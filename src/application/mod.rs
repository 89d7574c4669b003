// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// evaluating a checkpoint.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing of results (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The evaluation workflow
pub mod validate_use_case;
