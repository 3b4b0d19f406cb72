use crate::services::daily_session::DailySessionService;

/// Top up every reservoir under the low-water mark. Picks up categories whose
/// background refill failed after a daily selection.
pub async fn run(daily: &DailySessionService) {
    tracing::debug!("reservoir_refill: start");
    match daily.refill_low_reservoirs().await {
        Ok(appended) => tracing::info!(appended, "reservoir_refill: done"),
        Err(e) => tracing::error!(error = %e, "reservoir_refill failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{LLMConfig, ReservoirConfig};
    use crate::models::Category;
    use crate::services::llm_provider::LlmProvider;
    use crate::store::Store;

    #[tokio::test]
    async fn fills_empty_reservoirs_up_to_one_batch() {
        let store = Arc::new(Store::temporary().unwrap());
        let generator = Arc::new(LlmProvider::new(&LLMConfig::default()));
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()));
        let config = ReservoirConfig {
            min_batch_size: 4,
            low_water_mark: 2,
            max_daily_words: 10,
        };
        let daily = DailySessionService::new(store.clone(), generator, clock, config);

        run(&daily).await;
        for category in Category::ALL {
            assert_eq!(store.reservoir_len(category).unwrap(), 4);
        }

        // Above the mark now, so a second run changes nothing.
        run(&daily).await;
        assert_eq!(store.reservoir_len(Category::Ielts).unwrap(), 4);
    }
}
