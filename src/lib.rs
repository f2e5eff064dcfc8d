//! LinkCore: Entity & Term Linking Engine
//!
//! A Rust/WASM implementation of the article linking pipeline: given a block
//! of article text and a catalog of known entities and glossary terms, find
//! every in-text mention, resolve overlaps deterministically, score
//! confidence, optionally rerank per reader, and assemble a relationship
//! graph among the entities found.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `normalize.rs` - Markup stripping and whitespace collapse
//! - `language.rs` - RTL/Arabic ratio heuristic
//! - `pattern.rs` - Surface-string compilation (names, localized names, aliases)
//! - `boundary.rs` - Word-character classification for boundary checks
//! - `matcher.rs` - LinkMatcher: Aho-Corasick scan + importance-ordered overlap resolution
//! - `score.rs` - Confidence scoring and ranking
//!
//! ## Pipeline Components
//! - `personalize.rs` - Interest-profile reranking
//! - `graph.rs` - Relationship graph over matched entities (petgraph)
//! - `engine.rs` - LinkingEngine: orchestration and result assembly
//! - `catalog/` - Data model, collaborator traits, in-memory snapshot
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { LinkCortex } from 'linkcore';
//!
//! await init();
//!
//! const cortex = new LinkCortex(null);
//! cortex.hydrateEntities([
//!   { id: 'e1', name: 'نيوم', entity_type: 'project', importance: 9, slug: 'neom' }
//! ]);
//!
//! const result = await cortex.analyze({ text: 'أعلن أحمد علي عن مشروع نيوم الجديد' });
//! console.log(result.entityMatches);
//! console.log(result.knowledgeGraph);
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod personalize;
pub mod scanner;
pub mod wasm;


pub use catalog::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use graph::*;
pub use personalize::*;
pub use scanner::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("linkcore v{}", env!("CARGO_PKG_VERSION"))
}
