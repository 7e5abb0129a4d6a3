#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateRunRequest {
    Config(StudioConfig),
    WithOptions(CreateRunOptions),
}

#[derive(Debug, Deserialize)]
struct CreateRunOptions {
    config: StudioConfig,
    auto_start: Option<bool>,
    auto_interval_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CreateRunResponse {
    schema_version: String,
    run_id: String,
    status: StudioStatus,
    replaced_existing_run: bool,
    auto_started: bool,
}

async fn create_run(
    State(state): State<AppState>,
    Json(request): Json<CreateRunRequest>,
) -> Result<Json<CreateRunResponse>, HttpApiError> {
    let (config, auto_start, auto_interval_ms) = match request {
        CreateRunRequest::Config(config) => (config, false, DEFAULT_AUTO_INTERVAL_MS),
        CreateRunRequest::WithOptions(options) => (
            options.config,
            options.auto_start.unwrap_or(false),
            options.auto_interval_ms.unwrap_or(DEFAULT_AUTO_INTERVAL_MS),
        ),
    };

    let response = {
        let mut inner = state.inner.lock().await;
        inner.stop_auto();
        let replaced_existing_run = inner.engine.is_some();
        let engine = EngineApi::from_config(config);
        let run_id = engine.run_id();
        let status = engine.status();
        inner.engine = Some(engine);

        if auto_start {
            start_auto_loop(&state, &mut inner, auto_interval_ms);
        }

        info!(target: "studio.api", %run_id, replaced_existing_run, "run created");
        CreateRunResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id,
            status,
            replaced_existing_run,
            auto_started: auto_start,
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize, Default)]
struct AdvanceTurnRequest {
    weeks: Option<u64>,
}

#[derive(Debug, Serialize)]
struct AdvanceTurnResponse {
    schema_version: String,
    run_id: String,
    status: StudioStatus,
    completed_weeks: u64,
}

async fn advance_turn(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    request: Option<Json<AdvanceTurnRequest>>,
) -> Result<Json<AdvanceTurnResponse>, HttpApiError> {
    let weeks = request
        .map(|Json(body)| body.weeks.unwrap_or(1))
        .unwrap_or(1);
    if weeks == 0 {
        return Err(HttpApiError::invalid_query("weeks must be at least 1", None));
    }

    let response = {
        let mut inner = state.inner.lock().await;
        let engine = require_run_mut(&mut inner, &run_id)?;
        if engine.status().waiting_for_agents {
            return Err(HttpApiError::turn_in_progress());
        }
        let (status, completed_weeks) = engine.advance_weeks(weeks).await;
        AdvanceTurnResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: run_id.clone(),
            status,
            completed_weeks,
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct AutoProgressRequest {
    enabled: bool,
    interval_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct AutoProgressResponse {
    schema_version: String,
    run_id: String,
    enabled: bool,
    interval_ms: u64,
}

/// Toggle the automatic weekly progression. Disabling only prevents the
/// next turn from being scheduled; a turn in flight always completes.
async fn set_auto_progress(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AutoProgressRequest>,
) -> Result<Json<AutoProgressResponse>, HttpApiError> {
    let response = {
        let mut inner = state.inner.lock().await;
        require_run(&inner, &run_id)?;

        inner.stop_auto();
        let interval_ms = request
            .interval_ms
            .unwrap_or(DEFAULT_AUTO_INTERVAL_MS)
            .max(MIN_AUTO_INTERVAL_MS);
        if request.enabled {
            start_auto_loop(&state, &mut inner, interval_ms);
        }

        info!(
            target: "studio.api",
            %run_id,
            enabled = request.enabled,
            interval_ms,
            "auto progression toggled"
        );
        AutoProgressResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: run_id.clone(),
            enabled: request.enabled,
            interval_ms,
        }
    };

    Ok(Json(response))
}

fn start_auto_loop(state: &AppState, inner: &mut ServerInner, interval_ms: u64) {
    let enabled = Arc::new(AtomicBool::new(true));
    inner.auto = Some(AutoLoop {
        enabled: Arc::clone(&enabled),
        interval_ms,
    });

    let state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if !enabled.load(Ordering::SeqCst) {
                break;
            }
            let mut inner = state.inner.lock().await;
            let Some(engine) = inner.engine.as_mut() else {
                break;
            };
            let (status, _) = engine.advance_weeks(1).await;
            if status.mode == StudioMode::Released {
                info!(target: "studio.api", "auto progression stopped at release");
                enabled.store(false, Ordering::SeqCst);
                break;
            }
        }
    });
}
