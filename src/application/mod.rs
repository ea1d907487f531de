// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case coordinates the data and infra layers to do one
// job end to end:
//
//   mark_use_case       — mark every record of a dataset file
//   type_vocab_use_case — write dataset/type2id.json
//   sample_use_case     — write dataset/train_<p>.txt subsets
//
// No printing here (that's Layer 1) and no marking logic (that's
// Layer 4). Only workflow coordination.

pub mod mark_use_case;

pub mod type_vocab_use_case;

pub mod sample_use_case;
