use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::SubscriptionStatusView;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn fetch_status(&self) -> Result<SubscriptionStatusView, String>;
}

/// Background poll of the subscription status while a session is active.
/// The task stops on [`SubscriptionPoller::stop`] or when the poller is dropped.
pub struct SubscriptionPoller {
    receiver: watch::Receiver<Option<SubscriptionStatusView>>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionPoller {
    pub fn spawn(source: Arc<dyn SubscriptionSource>, period: Duration) -> Self {
        let (sender, receiver) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match source.fetch_status().await {
                    Ok(status) => {
                        sender.send_if_modified(|current| {
                            if current.as_ref() == Some(&status) {
                                false
                            } else {
                                *current = Some(status);
                                true
                            }
                        });
                    }
                    Err(err) => {
                        tracing::warn!("subscription status poll failed: {}", err);
                    }
                }
                if sender.is_closed() {
                    break;
                }
            }
        });

        Self {
            receiver,
            task: Some(task),
        }
    }

    pub fn latest(&self) -> Option<SubscriptionStatusView> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SubscriptionStatusView>> {
        self.receiver.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SubscriptionPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SubscriptionSource for CountingSource {
        async fn fetch_status(&self) -> Result<SubscriptionStatusView, String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 1 {
                return Err("timeout".to_string());
            }
            Ok(SubscriptionStatusView {
                active: call > 0,
                ..Default::default()
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_every_tick_and_keeps_last_value_on_error() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let poller = SubscriptionPoller::spawn(source.clone(), DEFAULT_POLL_INTERVAL);
        let mut updates = poller.subscribe();

        updates.changed().await.unwrap();
        assert_eq!(poller.latest().map(|s| s.active), Some(false));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.latest().map(|s| s.active), Some(false));

        updates.changed().await.unwrap();
        assert_eq!(poller.latest().map(|s| s.active), Some(true));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_the_timer() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let mut poller = SubscriptionPoller::spawn(source.clone(), DEFAULT_POLL_INTERVAL);
        tokio::task::yield_now().await;
        poller.stop();
        assert!(!poller.is_running());

        let before = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_the_timer() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let poller = SubscriptionPoller::spawn(source.clone(), DEFAULT_POLL_INTERVAL);
        tokio::task::yield_now().await;
        drop(poller);

        let before = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), before);
    }
}
