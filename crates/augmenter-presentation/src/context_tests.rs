
    use super::*;
    use async_trait::async_trait;
    use augmenter_protocols::{StoreError, SyncStore, WriteOutcome};
    use augmenter_store::MemoryStore;

    use parking_lot::Mutex;

    use crate::view::{ConnectionStatus, NO_INPUT_MESSAGE, OPEN_HOST_MESSAGE};

    /// Refresh channel that behaves like an observer: writes fresh text to
    /// the store, then acknowledges.
    struct FakeObserver {
        store: SharedStore,
        text: String,
    }

    #[async_trait]
    impl RefreshChannel for FakeObserver {
        async fn request_refresh(
            &self,
            _request: RefreshRequest,
        ) -> Result<RefreshResponse, RefreshError> {
            self.store
                .write(InputSnapshot::new(self.text.clone(), true))
                .await
                .map_err(|e| RefreshError::Rejected(e.to_string()))?;
            Ok(RefreshResponse::ok())
        }
    }

    struct GoneObserver;

    #[async_trait]
    impl RefreshChannel for GoneObserver {
        async fn request_refresh(
            &self,
            _request: RefreshRequest,
        ) -> Result<RefreshResponse, RefreshError> {
            Err(RefreshError::Unavailable("page closed".to_string()))
        }
    }

    /// Observer whose page URL can be switched between hosts.
    struct NavigatingObserver {
        host: Mutex<HostStatus>,
    }

    impl NavigatingObserver {
        fn at(host: HostStatus) -> Self {
            Self {
                host: Mutex::new(host),
            }
        }
    }

    #[async_trait]
    impl RefreshChannel for NavigatingObserver {
        async fn request_refresh(
            &self,
            _request: RefreshRequest,
        ) -> Result<RefreshResponse, RefreshError> {
            Ok(RefreshResponse::ok())
        }

        async fn host_status(&self) -> Result<HostStatus, RefreshError> {
            Ok(*self.host.lock())
        }
    }

    /// Store whose notifications never fire, so only polling sees writes.
    struct QuietStore {
        inner: MemoryStore,
        silent: broadcast::Sender<InputSnapshot>,
    }

    impl QuietStore {
        fn new() -> Self {
            let (silent, _) = broadcast::channel(1);
            Self {
                inner: MemoryStore::new(),
                silent,
            }
        }
    }

    #[async_trait]
    impl SyncStore for QuietStore {
        fn id(&self) -> &str {
            "quiet"
        }

        async fn write(&self, snapshot: InputSnapshot) -> Result<WriteOutcome, StoreError> {
            self.inner.write(snapshot).await
        }

        async fn read(&self) -> Result<InputSnapshot, StoreError> {
            self.inner.read().await
        }

        fn subscribe(&self) -> broadcast::Receiver<InputSnapshot> {
            self.silent.subscribe()
        }
    }

    fn options() -> PresentationOptions {
        PresentationOptions {
            poll_interval: Duration::from_millis(2000),
            refresh_settle: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_options_from_config() {
        let options = PresentationOptions::default();
        assert_eq!(options.poll_interval, Duration::from_millis(2000));
        assert_eq!(options.refresh_settle, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_reload_renders_only_changes() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ctx = PresentationContext::new(Arc::clone(&store), options());

        let first = ctx.reload().await.unwrap();
        assert_eq!(first.status, ConnectionStatus::Disconnected);
        assert_eq!(first.body(), NO_INPUT_MESSAGE);
        assert!(ctx.reload().await.is_none());

        store.write(InputSnapshot::new("draft", true)).await.unwrap();
        let second = ctx.reload().await.unwrap();
        assert_eq!(second.status, ConnectionStatus::Connected);
        assert_eq!(second.body(), "draft");
    }

    #[tokio::test]
    async fn test_record_uses_store_wire_names() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.write(InputSnapshot::new("draft", true)).await.unwrap();
        let mut ctx = PresentationContext::new(Arc::clone(&store), options());
        ctx.reload().await;

        let json = serde_json::to_value(ctx.record()).unwrap();
        assert_eq!(json["currentInputText"], "draft");
        assert_eq!(json["isConnected"], true);
        assert!(json["lastUpdated"].is_string());
        assert!(json.get("text").is_none());
    }

    #[tokio::test]
    async fn test_apply_ignores_older_notifications() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut rx = store.subscribe();
        store.write(InputSnapshot::new("one", true)).await.unwrap();
        store.write(InputSnapshot::new("two", true)).await.unwrap();
        let one = rx.recv().await.unwrap();
        let two = rx.recv().await.unwrap();

        let mut ctx = PresentationContext::new(store, options());
        assert!(ctx.apply(two).is_some());
        assert!(ctx.apply(one).is_none());
        assert_eq!(ctx.snapshot().text, "two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_reads_fresh_text() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.write(InputSnapshot::new("stale", true)).await.unwrap();
        let observer = FakeObserver {
            store: Arc::clone(&store),
            text: "fresh".to_string(),
        };
        let mut ctx =
            PresentationContext::new(Arc::clone(&store), options()).with_refresh(Arc::new(observer));
        ctx.reload().await;

        let response = ctx.manual_refresh().await.unwrap();
        assert!(response.success);
        assert_eq!(ctx.view().unwrap().body(), "fresh");
        assert!(!ctx.propagation_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_shows_reload_message() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.write(InputSnapshot::new("kept", true)).await.unwrap();
        let mut ctx =
            PresentationContext::new(Arc::clone(&store), options()).with_refresh(Arc::new(GoneObserver));
        let mut renders = ctx.subscribe();

        let err = ctx.manual_refresh().await.unwrap_err();
        assert!(matches!(err, PresentationError::Refresh(RefreshError::Unavailable(_))));

        let view = ctx.view().unwrap();
        assert_eq!(view.status, ConnectionStatus::PropagationFailed);
        assert_eq!(view.body(), "kept");
        assert!(renders.try_recv().is_ok());

        // A later successful refresh clears the failure.
        ctx.refresh = Some(Arc::new(FakeObserver {
            store: Arc::clone(&store),
            text: "kept".to_string(),
        }));
        ctx.manual_refresh().await.unwrap();
        assert_eq!(ctx.view().unwrap().status, ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_without_channel() {
        let mut ctx = PresentationContext::new(Arc::new(MemoryStore::new()), options());
        assert!(ctx.manual_refresh().await.is_err());
        assert!(ctx.propagation_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_renders_on_notification() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let ctx = PresentationContext::new(Arc::clone(&store), options());
        let mut renders = ctx.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ctx.run(cancel.clone()));

        let initial = renders.recv().await.unwrap();
        assert_eq!(initial.status, ConnectionStatus::Disconnected);

        store.write(InputSnapshot::new("hello", true)).await.unwrap();
        let view = renders.recv().await.unwrap();
        assert_eq!(view.body(), "hello");
        assert_eq!(view.char_count, 5);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_backstop_without_notifications() {
        let store: SharedStore = Arc::new(QuietStore::new());
        let ctx = PresentationContext::new(Arc::clone(&store), options());
        let mut renders = ctx.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ctx.run(cancel.clone()));

        renders.recv().await.unwrap();
        store.write(InputSnapshot::new("missed", true)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(renders.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(renders.try_recv().unwrap().body(), "missed");

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_handles_refresh_trigger() {
        let store: SharedStore = Arc::new(QuietStore::new());
        let observer = FakeObserver {
            store: Arc::clone(&store),
            text: "on demand".to_string(),
        };
        let ctx = PresentationContext::new(Arc::clone(&store), options()).with_refresh(Arc::new(observer));
        let trigger = ctx.refresh_trigger();
        let mut renders = ctx.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ctx.run(cancel.clone()));

        renders.recv().await.unwrap();
        trigger.send(()).await.unwrap();
        let view = renders.recv().await.unwrap();
        assert_eq!(view.body(), "on demand");

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_check_host_marks_off_host_page() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.write(InputSnapshot::new("draft", true)).await.unwrap();
        let mut ctx = PresentationContext::new(Arc::clone(&store), options())
            .with_refresh(Arc::new(NavigatingObserver::at(HostStatus::OffHost)));
        ctx.reload().await;
        assert_eq!(ctx.view().unwrap().status, ConnectionStatus::Connected);

        assert_eq!(ctx.check_host().await, HostStatus::OffHost);
        let view = ctx.view().unwrap();
        assert_eq!(view.status, ConnectionStatus::OffHost);
        assert_eq!(view.body(), OPEN_HOST_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_observer_leaves_host_unknown() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ctx =
            PresentationContext::new(Arc::clone(&store), options()).with_refresh(Arc::new(GoneObserver));
        assert_eq!(ctx.check_host().await, HostStatus::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_follows_navigation_back_to_host() {
        let store: SharedStore = Arc::new(QuietStore::new());
        store.write(InputSnapshot::new("draft", true)).await.unwrap();
        let observer = Arc::new(NavigatingObserver::at(HostStatus::OffHost));
        let ctx = PresentationContext::new(Arc::clone(&store), options())
            .with_refresh(Arc::clone(&observer) as Arc<dyn RefreshChannel>);
        let mut renders = ctx.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ctx.run(cancel.clone()));

        assert_eq!(renders.recv().await.unwrap().status, ConnectionStatus::Connected);
        assert_eq!(renders.recv().await.unwrap().status, ConnectionStatus::OffHost);

        *observer.host.lock() = HostStatus::OnHost;
        tokio::time::sleep(Duration::from_millis(2100)).await;
        let view = renders.try_recv().unwrap();
        assert_eq!(view.status, ConnectionStatus::Connected);
        assert_eq!(view.body(), "draft");

        cancel.cancel();
        task.await.unwrap();
    }
