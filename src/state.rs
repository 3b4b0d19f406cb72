use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;

use crate::clock::Clock;
use crate::config::Config;
use crate::services::daily_session::DailySessionService;
use crate::services::generator::WordGenerator;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    generator: Arc<dyn WordGenerator>,
    daily: DailySessionService,
    clock: Arc<dyn Clock>,
    review_rng: Arc<Mutex<StdRng>>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        generator: Arc<dyn WordGenerator>,
        clock: Arc<dyn Clock>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let daily = DailySessionService::new(
            store.clone(),
            generator.clone(),
            clock.clone(),
            config.reservoir,
        );
        let rng = match config.review.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            generator,
            daily,
            clock,
            review_rng: Arc::new(Mutex::new(rng)),
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn generator(&self) -> &dyn WordGenerator {
        self.generator.as_ref()
    }

    pub fn daily(&self) -> &DailySessionService {
        &self.daily
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Run `f` with the shared review RNG. Never hold it across an await.
    pub fn with_review_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.review_rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::Rng;

    use super::*;
    use crate::clock::FixedClock;
    use crate::services::llm_provider::LlmProvider;

    fn state_with_seed(seed: Option<u64>, tx: broadcast::Sender<()>) -> AppState {
        let mut cfg = Config::from_env();
        cfg.review.shuffle_seed = seed;
        let store = Arc::new(Store::temporary().unwrap());
        let generator = Arc::new(LlmProvider::new(&cfg.llm));
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        AppState::new(store, generator, clock, &cfg, tx)
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let (tx, _) = broadcast::channel(4);
        let a = state_with_seed(Some(42), tx.clone());
        let b = state_with_seed(Some(42), tx);
        let x: u64 = a.with_review_rng(|rng| rng.gen());
        let y: u64 = b.with_review_rng(|rng| rng.gen());
        assert_eq!(x, y);
        assert_eq!(a.today(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (tx, _) = broadcast::channel(4);
        let state = state_with_seed(None, tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }
}
