#[derive(Debug, Serialize)]
struct StatusResponse {
    schema_version: String,
    status: StudioStatus,
}

async fn get_status(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    Ok(Json(StatusResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        status: engine.status(),
    }))
}

async fn get_snapshot(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    Ok(Json(engine.snapshot()))
}

#[derive(Debug, Deserialize)]
struct SubmitCommandRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SubmitCommandResponse {
    schema_version: String,
    run_id: String,
    parsed: StudioCommand,
    queue_depth: usize,
}

async fn submit_command(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitCommandRequest>,
) -> Result<Json<SubmitCommandResponse>, HttpApiError> {
    if request.text.trim().is_empty() {
        return Err(HttpApiError::invalid_command("command text is empty", None));
    }

    let response = {
        let mut inner = state.inner.lock().await;
        let engine = require_run_mut(&mut inner, &run_id)?;
        let parsed = engine.enqueue_command(request.text);
        SubmitCommandResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: run_id.clone(),
            parsed,
            queue_depth: engine.status().queue_depth,
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct CommandAuditResponse {
    schema_version: String,
    run_id: String,
    entries: Vec<CommandAuditEntry>,
}

async fn get_commands(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CommandAuditResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    Ok(Json(CommandAuditResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        run_id: run_id.clone(),
        entries: engine.command_audit().to_vec(),
    }))
}
