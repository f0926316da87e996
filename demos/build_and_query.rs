/// Builds a small film index on disk, loads it back and runs a couple of
/// queries with explanations. Querying [1, 5] (two space operas) should
/// surface the other space operas ahead of the dramas.
use bayesets::{AttributionMode, ComputedIndex, IndexOptions, IndexWriter, Indexer};

const FILM_TAGS: &[(u64, &str)] = &[
    (1, "space"),
    (1, "opera"),
    (1, "rebels"),
    (2, "space"),
    (2, "opera"),
    (2, "empire"),
    (3, "space"),
    (3, "marines"),
    (4, "courtroom"),
    (4, "drama"),
    (5, "space"),
    (5, "opera"),
    (5, "smugglers"),
    (6, "drama"),
    (6, "boxing"),
];

fn main() -> bayesets::Result<()> {
    env_logger::init();

    let dir = std::env::temp_dir().join("bayesets-demo");
    let writer = IndexWriter::create(&dir)?;
    let stats = Indexer::new(writer)
        .index_all(FILM_TAGS.iter().map(|&(id, tag)| (id, tag.to_string())))?;
    println!(
        "indexed {} pairs over {} films and {} tags into {}",
        stats.pairs,
        stats.items,
        stats.features,
        dir.display()
    );

    let options = IndexOptions::new().with_attribution_mode(AttributionMode::PresentOnly);
    let index = ComputedIndex::load_with(&dir, options)?;

    let query = [1u64, 5];
    println!("\nfilms most like {query:?}:");
    let ranked = index.query(&query, Some(6));
    for &(id, log_score) in &ranked {
        println!("  film {id:>2}  log score {log_score:+.4}");
    }

    let candidates: Vec<u64> = ranked.iter().map(|&(id, _)| id).take(3).collect();
    println!("\nwhy they match:");
    for (id, explanation) in candidates.iter().zip(index.get_detailed_scores(
        &query,
        &candidates,
        4,
    )) {
        let terms: Vec<String> = explanation
            .scores
            .iter()
            .map(|(tag, c)| format!("{tag} {c:+.3}"))
            .collect();
        println!("  film {id}: {}", terms.join(", "));
    }

    Ok(())
}
