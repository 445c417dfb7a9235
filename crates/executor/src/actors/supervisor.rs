use std::{collections::HashMap, time::Duration};
use tracing::{error, info, warn};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

use common::actors::{Actor, ActorType, ControlMessage};

pub type ActorFactory = Box<dyn Fn() -> Box<dyn Actor> + Send + Sync>;

pub struct Supervisor {
    actor_factories: HashMap<ActorType, ActorFactory>,
    pulses: HashMap<ActorType, Instant>,
    handles: HashMap<ActorType, JoinHandle<()>>,
    check_interval: Duration,
    timeout_duration: Duration,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            actor_factories: HashMap::new(),
            pulses: HashMap::new(),
            handles: HashMap::new(),
            check_interval: Duration::from_secs(1),
            timeout_duration: Duration::from_secs(3),
        }
    }

    pub fn with_liveness(mut self, check_interval: Duration, timeout_duration: Duration) -> Self {
        self.check_interval = check_interval;
        self.timeout_duration = timeout_duration;
        self
    }

    pub fn register_actor(&mut self, actor_type: ActorType, factory: ActorFactory) {
        self.actor_factories.insert(actor_type, factory);
    }

    /// Runs until Ctrl-C.
    pub async fn start(&mut self) {
        self.run_until(tokio::signal::ctrl_c()).await;
    }

    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: std::future::Future,
    {
        tokio::pin!(shutdown);
        let mut check_interval = time::interval(self.check_interval);

        let (supervisor_tx, mut supervisor_rx) = mpsc::channel::<ControlMessage>(512);

        let actors: Vec<ActorType> = self.actor_factories.keys().copied().collect();
        actors.into_iter().for_each(|actor| {
            self.spawn_actor(actor, supervisor_tx.clone());
        });

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping {} actors.", self.handles.len());
                    break;
                }

                Some(msg) = supervisor_rx.recv() => {
                    match msg {
                        ControlMessage::Heartbeat(actor_type) => {
                            if self.handles.contains_key(&actor_type) {
                                self.pulses.insert(actor_type, Instant::now());
                            }
                        }
                        ControlMessage::Error(actor_type, error_msg) => {
                            error!("Actor {:?} reported error: {}", actor_type, error_msg);
                        },
                    }
                }

                _ = check_interval.tick() => {
                    let dead_timeout = Instant::now() - self.timeout_duration;

                    let mut dead_actors: Vec<ActorType> = self
                        .pulses
                        .iter()
                        .filter(|(_, last)| **last < dead_timeout)
                        .map(|(key, _)| *key)
                        .collect();

                    // A run that returned or panicked is dead even if its pulse is fresh.
                    let finished: Vec<ActorType> = self
                        .handles
                        .iter()
                        .filter(|(key, handle)| handle.is_finished() && !dead_actors.contains(*key))
                        .map(|(key, _)| *key)
                        .collect();
                    dead_actors.extend(finished);

                    dead_actors.into_iter().for_each(|actor_type| {
                        warn!("{:?} is unresponsive! Restarting.", actor_type);
                        if let Some(handle) = self.handles.remove(&actor_type) {
                            handle.abort();
                        }
                        self.spawn_actor(actor_type, supervisor_tx.clone());
                    });
                }
            }
        }

        self.handles.drain().for_each(|(_, handle)| handle.abort());
        self.pulses.clear();
    }

    fn spawn_actor(&mut self, actor_type: ActorType, tx: mpsc::Sender<ControlMessage>) {
        let Some(factory) = self.actor_factories.get(&actor_type) else {
            return;
        };
        let mut new_actor = factory();
        let new_actor_handle = tokio::spawn(async move {
            if let Err(e) = new_actor.run(tx).await {
                error!("Actor {:?} crashed: {}", &actor_type, e);
            }
        });
        self.handles.insert(actor_type, new_actor_handle);
        self.pulses.insert(actor_type, Instant::now());
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::oneshot;

    struct Crashing {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Actor for Crashing {
        fn name(&self) -> ActorType {
            ActorType::RelayActor
        }

        async fn run(&mut self, _tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }
    }

    struct Healthy {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Actor for Healthy {
        fn name(&self) -> ActorType {
            ActorType::HealthActor
        }

        async fn run(&mut self, tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            loop {
                tx.send(ControlMessage::Heartbeat(self.name())).await?;
                time::sleep(Duration::from_millis(10)).await;
            }
        }
    }

    struct Panicking {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Actor for Panicking {
        fn name(&self) -> ActorType {
            ActorType::RelayActor
        }

        async fn run(&mut self, tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let _heartbeat = self.spawn_heartbeat(tx);
            time::sleep(Duration::from_millis(20)).await;
            panic!("dispatcher panicked")
        }
    }

    fn fast_supervisor() -> Supervisor {
        Supervisor::new().with_liveness(Duration::from_millis(20), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn restarts_crashed_actor() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut supervisor = fast_supervisor();
        let counter = runs.clone();
        supervisor.register_actor(
            ActorType::RelayActor,
            Box::new(move || -> Box<dyn Actor> { Box::new(Crashing { runs: counter.clone() }) }),
        );

        supervisor
            .run_until(time::sleep(Duration::from_millis(600)))
            .await;

        assert!(runs.load(Ordering::SeqCst) >= 2, "actor was not restarted");
    }

    #[tokio::test]
    async fn restarts_panicked_actor_with_fresh_pulse() {
        let runs = Arc::new(AtomicUsize::new(0));
        // pulse timeout far longer than the run, so only the finished task can trigger a restart
        let mut supervisor =
            Supervisor::new().with_liveness(Duration::from_millis(50), Duration::from_millis(5000));
        let counter = runs.clone();
        supervisor.register_actor(
            ActorType::RelayActor,
            Box::new(move || -> Box<dyn Actor> { Box::new(Panicking { runs: counter.clone() }) }),
        );

        supervisor
            .run_until(time::sleep(Duration::from_millis(1000)))
            .await;

        assert!(
            runs.load(Ordering::SeqCst) >= 2,
            "panicked actor was not restarted (runs = {})",
            runs.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn healthy_actor_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut supervisor = fast_supervisor();
        let counter = runs.clone();
        supervisor.register_actor(
            ActorType::HealthActor,
            Box::new(move || -> Box<dyn Actor> { Box::new(Healthy { runs: counter.clone() }) }),
        );

        supervisor
            .run_until(time::sleep(Duration::from_millis(400)))
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_supervisor() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut supervisor = fast_supervisor();
        supervisor.register_actor(
            ActorType::HealthActor,
            Box::new(|| -> Box<dyn Actor> {
                Box::new(Healthy {
                    runs: Arc::new(AtomicUsize::new(0)),
                })
            }),
        );

        let task = tokio::spawn(async move {
            supervisor.run_until(stop_rx).await;
            supervisor.handles.len()
        });
        stop_tx.send(()).unwrap();

        let remaining = time::timeout(Duration::from_secs(1), task)
            .await
            .expect("supervisor did not stop")
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
