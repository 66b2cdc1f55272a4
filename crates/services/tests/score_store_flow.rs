use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mathulator_core::model::{DifficultyBounds, Operator, ScoreMatrix};
use services::ScoreStore;
use storage::repository::{InMemoryRepository, ScoreMatrixRecord, ScoreRepository, StorageError};

/// Counts saves and can be told to fail them.
#[derive(Default)]
struct CountingRepository {
    inner: InMemoryRepository,
    saves: AtomicUsize,
    fail_saves: bool,
}

#[async_trait]
impl ScoreRepository for CountingRepository {
    async fn load_scores(&self) -> Result<Option<ScoreMatrixRecord>, StorageError> {
        self.inner.load_scores().await
    }

    async fn save_scores(&self, record: &ScoreMatrixRecord) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_scores(record).await
    }
}

struct BrokenRepository;

#[async_trait]
impl ScoreRepository for BrokenRepository {
    async fn load_scores(&self) -> Result<Option<ScoreMatrixRecord>, StorageError> {
        Err(StorageError::Serialization("expected value at line 1".into()))
    }

    async fn save_scores(&self, _record: &ScoreMatrixRecord) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn best_streak_survives_restart() {
    let repo = InMemoryRepository::new();
    let bounds = DifficultyBounds::default();

    let store = ScoreStore::initialize(Arc::new(repo.clone()), bounds).await;
    store.update_if_higher(5, 11, Operator::Add).await.unwrap();
    store.update_if_higher(3, 11, Operator::Add).await.unwrap();
    store.update_if_higher(12, 30, Operator::Multiply).await.unwrap();
    drop(store);

    let reopened = ScoreStore::initialize(Arc::new(repo), bounds).await;
    assert_eq!(reopened.high_score(11, Operator::Add).await, 5);
    assert_eq!(reopened.high_score(30, Operator::Multiply).await, 12);

    reopened.reset(11, Operator::Add).await.unwrap();
    assert_eq!(reopened.high_score(11, Operator::Add).await, 0);
}

#[tokio::test]
async fn high_score_tracks_running_maximum() {
    let store = ScoreStore::initialize(
        Arc::new(InMemoryRepository::new()),
        DifficultyBounds::default(),
    )
    .await;
    let streaks = [2, 9, 4, 9, 1, 15, 0, 7];
    let mut best = 0;
    for streak in streaks {
        best = best.max(streak);
        store
            .update_if_higher(streak, 17, Operator::Subtract)
            .await
            .unwrap();
        assert_eq!(store.high_score(17, Operator::Subtract).await, best);
    }
}

#[tokio::test]
async fn non_improving_updates_do_not_write() {
    let repo = Arc::new(CountingRepository::default());
    let store = ScoreStore::initialize(repo.clone(), DifficultyBounds::default()).await;

    store.update_if_higher(4, 8, Operator::Divide).await.unwrap();
    store.update_if_higher(4, 8, Operator::Divide).await.unwrap();
    store.update_if_higher(2, 8, Operator::Divide).await.unwrap();
    store.update_if_higher(9, 99, Operator::Divide).await.unwrap();
    assert_eq!(repo.saves.load(Ordering::SeqCst), 1);

    // Reset always writes, even when the cell is already zero.
    store.reset(8, Operator::Add).await.unwrap();
    assert_eq!(repo.saves.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_save_keeps_previous_value() {
    let repo = Arc::new(CountingRepository {
        fail_saves: true,
        ..CountingRepository::default()
    });
    let store = ScoreStore::initialize(repo, DifficultyBounds::default()).await;

    let err = store.update_if_higher(6, 11, Operator::Add).await.unwrap_err();
    assert!(matches!(err, services::ScoreStoreError::Storage(_)));
    assert_eq!(store.high_score(11, Operator::Add).await, 0);
}

#[tokio::test]
async fn malformed_or_unreadable_data_falls_back_to_zero() {
    let bounds = DifficultyBounds::default();

    let ragged = InMemoryRepository::with_scores(ScoreMatrixRecord {
        rows: vec![vec![3, 3, 3, 3], vec![1, 2]],
    });
    let store = ScoreStore::initialize(Arc::new(ragged), bounds).await;
    assert_eq!(store.snapshot().await, ScoreMatrix::new(bounds));

    let negative = InMemoryRepository::with_scores(ScoreMatrixRecord {
        rows: vec![vec![0, -4, 0, 0]],
    });
    let store = ScoreStore::initialize(Arc::new(negative), bounds).await;
    assert_eq!(store.snapshot().await, ScoreMatrix::new(bounds));

    let store = ScoreStore::initialize(Arc::new(BrokenRepository), bounds).await;
    assert_eq!(store.high_score(6, Operator::Multiply).await, 0);
}

#[tokio::test]
async fn matrix_from_wider_bounds_is_resized() {
    let old_bounds = DifficultyBounds::new(6, 36).unwrap();
    let mut old = ScoreMatrix::new(old_bounds);
    old.raise(6, Operator::Multiply, 3);
    old.raise(30, Operator::Add, 8);
    old.raise(36, Operator::Divide, 2);
    let repo = InMemoryRepository::with_scores(ScoreMatrixRecord::from_matrix(&old));

    let new_bounds = DifficultyBounds::new(6, 30).unwrap();
    let store = ScoreStore::initialize(Arc::new(repo), new_bounds).await;
    assert_eq!(store.high_score(6, Operator::Multiply).await, 3);
    assert_eq!(store.high_score(30, Operator::Add).await, 8);
    assert_eq!(store.high_score(36, Operator::Divide).await, 0);
    assert_eq!(store.snapshot().await.to_rows().len(), 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_never_lose_the_maximum() {
    let store = Arc::new(
        ScoreStore::initialize(
            Arc::new(InMemoryRepository::new()),
            DifficultyBounds::default(),
        )
        .await,
    );

    let mut handles = Vec::new();
    for streak in (1..=64).rev() {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .update_if_higher(streak, 25, Operator::Multiply)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.high_score(25, Operator::Multiply).await, 64);
}
