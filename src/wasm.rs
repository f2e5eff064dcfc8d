//! LinkCortex: WASM facade over the linking engine
//!
//! Holds an in-memory catalog hydrated from JS. The catalog doubles as the
//! relationship feed and the mutation sink, so mention counters advance in
//! place after every analysis.

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::catalog::{Entity, InMemoryCatalog, Relationship, Term};
use crate::config::LinkerConfig;
use crate::engine::{LinkRequest, LinkResponse, LinkingEngine};
use crate::error::LinkResult;

#[wasm_bindgen]
pub struct LinkCortex {
    catalog: Arc<InMemoryCatalog>,
    engine: Arc<LinkingEngine>,
}

#[wasm_bindgen]
impl LinkCortex {
    /// `config` may be null/undefined or a partial `LinkerConfig` object
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<LinkCortex, JsValue> {
        let config = if config.is_null() || config.is_undefined() {
            LinkerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    #[wasm_bindgen(js_name = hydrateEntities)]
    pub fn js_hydrate_entities(&self, entities: JsValue) -> Result<(), JsValue> {
        let entities: Vec<Entity> = serde_wasm_bindgen::from_value(entities)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse entities: {}", e)))?;
        self.hydrate_entities(entities);
        Ok(())
    }

    #[wasm_bindgen(js_name = hydrateTerms)]
    pub fn js_hydrate_terms(&self, terms: JsValue) -> Result<(), JsValue> {
        let terms: Vec<Term> = serde_wasm_bindgen::from_value(terms)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse terms: {}", e)))?;
        self.hydrate_terms(terms);
        Ok(())
    }

    #[wasm_bindgen(js_name = hydrateRelationships)]
    pub fn js_hydrate_relationships(&self, relationships: JsValue) -> Result<(), JsValue> {
        let relationships: Vec<Relationship> = serde_wasm_bindgen::from_value(relationships)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse relationships: {}", e)))?;
        self.catalog.hydrate_relationships(relationships);
        Ok(())
    }

    #[wasm_bindgen(js_name = entityCount)]
    pub fn entity_count(&self) -> usize {
        self.catalog.entity_count()
    }

    #[wasm_bindgen(js_name = termCount)]
    pub fn term_count(&self) -> usize {
        self.catalog.term_count()
    }

    /// Surface strings compiled from the hydrated entities
    #[wasm_bindgen(js_name = entityPatternCount)]
    pub fn entity_pattern_count(&self) -> usize {
        self.engine.matcher().entity_pattern_count(&self.catalog.entities())
    }

    #[wasm_bindgen(js_name = termPatternCount)]
    pub fn term_pattern_count(&self) -> usize {
        self.engine.matcher().term_pattern_count(&self.catalog.terms())
    }

    /// Mention counter of an entity, 0 when unknown. Returned as a JS number,
    /// exact up to 2^53.
    #[wasm_bindgen(js_name = mentionCount)]
    pub fn mention_count(&self, entity_id: &str) -> f64 {
        self.catalog
            .entity(entity_id)
            .map_or(0.0, |e| e.mention_count() as f64)
    }

    #[wasm_bindgen(js_name = usageCount)]
    pub fn usage_count(&self, term_id: &str) -> f64 {
        self.catalog
            .term(term_id)
            .map_or(0.0, |t| t.usage_count() as f64)
    }

    /// Analyze a `LinkRequest` object. Resolves to a `LinkResponse`; rejects
    /// with a message on empty text.
    #[wasm_bindgen(js_name = analyze)]
    pub fn js_analyze(&self, request: JsValue) -> js_sys::Promise {
        let engine = Arc::clone(&self.engine);
        let request: Result<LinkRequest, _> = serde_wasm_bindgen::from_value(request);

        future_to_promise(async move {
            let request = request
                .map_err(|e| JsValue::from_str(&format!("Failed to parse request: {}", e)))?;
            let response = engine
                .analyze(&request)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;

            match serde_wasm_bindgen::to_value(&response) {
                Ok(v) => Ok(v),
                Err(e) => {
                    web_sys::console::error_1(
                        &format!("[LinkCortex] Serialization failed: {:?}", e).into(),
                    );
                    Ok(JsValue::NULL)
                }
            }
        })
    }
}

impl LinkCortex {
    pub fn with_config(config: LinkerConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::default());
        let engine = LinkingEngine::in_memory(Arc::clone(&catalog)).with_config(config);
        Self {
            catalog,
            engine: Arc::new(engine),
        }
    }

    pub fn hydrate_entities(&self, entities: Vec<Entity>) {
        self.catalog.hydrate_entities(entities);
    }

    pub fn hydrate_terms(&self, terms: Vec<Term>) {
        self.catalog.hydrate_terms(terms);
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub async fn analyze(&self, request: &LinkRequest) -> LinkResult<LinkResponse> {
        self.engine.analyze(request).await
    }
}

impl Default for LinkCortex {
    fn default() -> Self {
        Self::with_config(LinkerConfig::default())
    }
}
