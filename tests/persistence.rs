use chrono::{Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use kanadrill::catalog::{Catalog, Script};
use kanadrill::config::Config;
use kanadrill::engine::outcome::{bump_hint, bump_mistake, smooth_correct};
use kanadrill::engine::scores::ScoreBook;
use kanadrill::session::Trainer;
use kanadrill::store::backend::Backend;
use kanadrill::store::json_store::JsonStore;
use kanadrill::store::score_store::ScoreStore;

fn json_store(dir: &TempDir) -> JsonStore {
    JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()
}

#[test]
fn scores_round_trip_through_json_files() {
    let dir = TempDir::new().unwrap();
    let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();

    let mut book = ScoreBook::new();
    bump_mistake(&mut book, "ka", 1.0, now);
    smooth_correct(&mut book, "ka", 0.15, 3, now);
    bump_hint(&mut book, "shi", 1.0, now + Duration::seconds(5));

    let mut store = ScoreStore::open(json_store(&dir));
    store.save(book.clone());

    let reopened = ScoreStore::open(json_store(&dir));
    assert_eq!(reopened.load(), book);
    assert_eq!(reopened.snapshot(), &book);
}

#[test]
fn corrupt_scores_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("scores.json"), "{ not json").unwrap();
    let store = ScoreStore::open(json_store(&dir));
    assert!(store.load().is_empty());
}

#[test]
fn decay_at_gamma_one_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let mut store = ScoreStore::open(json_store(&dir));
    store.update_at(start, |book, now| bump_mistake(book, "ka", 2.5, now));
    store.decay_all_at(1.0, start + Duration::days(365));
    assert_eq!(store.get_score("ka"), 2.5);
}

#[test]
fn trainer_progress_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut trainer = Trainer::with_rng(
            Config::default(),
            Catalog::load(Script::Hiragana),
            json_store(&dir),
            SmallRng::seed_from_u64(9),
        );
        trainer.on_mistake("su").unwrap();
        trainer.set_max_duplicates(5);
        trainer.toggle_filter("n").unwrap();
    }

    let trainer = Trainer::with_rng(
        Config::default(),
        Catalog::load(Script::Hiragana),
        json_store(&dir),
        SmallRng::seed_from_u64(9),
    );
    assert!(trainer.get_score("su") > 0.99);
    assert_eq!(trainer.max_duplicates(), 5);
    assert!(!trainer.filter().contains("n"));
    assert!(trainer.pool().iter().all(|r| r.id != "n"));
}

#[test]
fn export_then_import_into_fresh_dir() {
    let src_dir = TempDir::new().unwrap();
    let src = json_store(&src_dir);
    let mut trainer = Trainer::with_rng(
        Config::default(),
        Catalog::load(Script::Katakana),
        src.clone(),
        SmallRng::seed_from_u64(5),
    );
    trainer.on_mistake("ka").unwrap();
    trainer.set_max_duplicates(7);

    let export = src.export_all(trainer.config());
    let json = serde_json::to_string(&export).unwrap();

    let dst_dir = TempDir::new().unwrap();
    let dst = json_store(&dst_dir);
    dst.import_all(&serde_json::from_str(&json).unwrap()).unwrap();

    let scores = dst.load_scores().unwrap().unwrap();
    assert_eq!(scores.entries, src.load_scores().unwrap().unwrap().entries);
    assert_eq!(dst.load_preferences().unwrap().unwrap().max_duplicates, 7);
}
