#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use server::{routes, AppState, Lifecycle, LifecycleError, LifecyclePhase};
use service::RecordStore;
use tokio::{sync::oneshot, task::JoinHandle};

pub struct TestApp {
    pub base_url: String,
    pub addr: SocketAddr,
    pub store: Arc<RecordStore>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), LifecycleError>>,
}

impl TestApp {
    /// Trigger shutdown and wait for the lifecycle to finish.
    pub async fn shutdown(mut self) -> Result<(), LifecycleError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.expect("lifecycle task panicked")
    }
}

pub async fn start_server(slow_delay: Duration, drain_timeout: Duration) -> anyhow::Result<TestApp> {
    let store = Arc::new(RecordStore::new());
    let app = routes::build_router(AppState::new(Arc::clone(&store), slow_delay));
    let server = Lifecycle::bind("127.0.0.1:0", app, drain_timeout).await?;
    let addr = server.local_addr();
    let mut phases = server.subscribe();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));
    phases.wait_for(|p| *p == LifecyclePhase::Listening).await?;

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        addr,
        store,
        stop: Some(stop_tx),
        handle,
    })
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("reqwest client")
}
