#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<ServerInner>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerInner::default())),
        }
    }
}

#[derive(Default)]
struct ServerInner {
    engine: Option<EngineApi>,
    auto: Option<AutoLoop>,
}

/// Handle on the automatic-progression task. Disabling flips the flag and
/// lets the task wind down on its own; a turn already running is never
/// aborted.
struct AutoLoop {
    enabled: Arc<AtomicBool>,
    interval_ms: u64,
}

impl ServerInner {
    fn stop_auto(&mut self) {
        if let Some(auto) = self.auto.take() {
            auto.enabled.store(false, Ordering::SeqCst);
        }
    }
}

fn require_run<'a>(inner: &'a ServerInner, run_id: &str) -> Result<&'a EngineApi, HttpApiError> {
    let Some(engine) = inner.engine.as_ref() else {
        return Err(HttpApiError::run_not_found(run_id, None));
    };

    let active_run_id = engine.run_id();
    if active_run_id != run_id {
        return Err(HttpApiError::run_not_found(
            run_id,
            Some(active_run_id.as_str()),
        ));
    }

    Ok(engine)
}

fn require_run_mut<'a>(
    inner: &'a mut ServerInner,
    run_id: &str,
) -> Result<&'a mut EngineApi, HttpApiError> {
    let active_run_id = inner.engine.as_ref().map(|engine| engine.run_id());
    let Some(engine) = inner.engine.as_mut() else {
        return Err(HttpApiError::run_not_found(run_id, None));
    };

    if engine.run_id() != run_id {
        return Err(HttpApiError::run_not_found(run_id, active_run_id.as_deref()));
    }

    Ok(engine)
}
