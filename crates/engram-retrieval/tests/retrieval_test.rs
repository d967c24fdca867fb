//! End-to-end retrieval over a real storage engine and the lexical provider.

use engram_core::config::RankerConfig;
use engram_core::memory::{MemoryRecord, Sector};
use engram_core::models::{RankingMethod, SearchQuery};
use engram_core::traits::{IEmbeddingProvider, IMemoryStorage};
use engram_embeddings::LexicalProvider;
use engram_retrieval::RetrievalEngine;
use engram_storage::StorageEngine;
use test_fixtures::memory;

const DIM: usize = 256;

fn seed(store: &StorageEngine, provider: &LexicalProvider, user: &str, content: &str) -> String {
    let m = memory(user, content, Sector::Episodic);
    let id = m.id.clone();
    let vectors = provider.embed(content).unwrap();
    let embeddings = vectors.into_rows(&id, provider.model_id(), m.created_at);
    store
        .insert_record(&MemoryRecord {
            memory: m,
            metadata: Default::default(),
            links: Vec::new(),
            embeddings,
        })
        .unwrap();
    id
}

#[test]
fn related_contents_outrank_unrelated() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);

    let db_a = seed(&store, &provider, "u1", "DB index missing");
    let db_b = seed(&store, &provider, "u1", "Query plan regression");
    let _other = seed(&store, &provider, "u1", "User login latency");

    let engine = RetrievalEngine::new(RankerConfig::default());
    let query = SearchQuery {
        limit: 2,
        ..SearchQuery::text("slow database query index")
    };
    let vectors = provider.embed(query.query_text.as_deref().unwrap()).unwrap();

    let response = engine.search(&store, "u1", &query, &vectors).unwrap();

    assert_eq!(response.ranking_method, RankingMethod::Composite);
    assert!(response.processing_time_ms > 0);
    assert!(!response.timed_out);
    // Both database memories share query vocabulary; the login memory has
    // zero overlap and must not appear in the top two.
    assert_eq!(response.hits.len(), 2);
    let ids: Vec<&str> = response.hits.iter().map(|h| h.memory.id.as_str()).collect();
    assert!(ids.contains(&db_a.as_str()));
    assert!(ids.contains(&db_b.as_str()));
}

#[test]
fn search_is_user_scoped() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    seed(&store, &provider, "u1", "secret observation");

    let engine = RetrievalEngine::new(RankerConfig::default());
    let query = SearchQuery::text("secret observation");
    let vectors = provider.embed("secret observation").unwrap();

    let response = engine.search(&store, "u2", &query, &vectors).unwrap();
    assert!(response.hits.is_empty());
    assert_eq!(response.total_candidates, 0);
}

#[test]
fn consolidated_memories_are_hidden_by_default() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    let id = seed(&store, &provider, "u1", "to be hidden away");
    store.set_archived("u1", &[id.clone()], true).unwrap();

    let engine = RetrievalEngine::new(RankerConfig::default());
    let vectors = provider.embed("hidden away").unwrap();

    let response = engine
        .search(&store, "u1", &SearchQuery::text("hidden away"), &vectors)
        .unwrap();
    assert!(response.hits.is_empty());

    let include = SearchQuery {
        include_consolidated: true,
        ..SearchQuery::text("hidden away")
    };
    let response = engine.search(&store, "u1", &include, &vectors).unwrap();
    assert_eq!(response.hits.len(), 1);
    assert_eq!(response.hits[0].memory.id, id);
}
