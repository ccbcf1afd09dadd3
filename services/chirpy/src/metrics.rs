//! Request hit counter behind the admin metrics page

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Counts requests to the static file server
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn read(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// HTML body of `GET /admin/metrics`
pub fn render_admin_metrics(hits: u64) -> String {
    format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_shared_between_clones() {
        let counter = HitCounter::new();
        let clone = counter.clone();

        assert_eq!(counter.increment(), 1);
        assert_eq!(clone.increment(), 2);
        assert_eq!(counter.read(), 2);

        clone.reset();
        assert_eq!(counter.read(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_increments() {
        let counter = HitCounter::new();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move {
                    for _ in 0..250 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(counter.read(), 2000);
    }

    #[test]
    fn test_render_admin_metrics() {
        let page = render_admin_metrics(7);
        assert!(page.contains("<h1>Welcome, Chirpy Admin</h1>"));
        assert!(page.contains("Chirpy has been visited 7 times!"));
    }
}
