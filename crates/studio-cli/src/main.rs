use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use contracts::{Snapshot, StudioConfig};
use studio_api::{serve, EngineApi};
use studio_core::{FallbackTextClient, SeededRandom};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("studio-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  turn [n]");
    println!("  declare <design directive...>");
    println!("  answer <question-id> <answer text...>");
    println!("  simulate [weeks] [seed]");
    println!("    offline run with the fallback text client, to release or <weeks>");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("{}", snapshot.status_line);
    for (agent, activity) in &snapshot.last_agent_activity {
        println!("  {agent}: {activity}");
    }
    for question in &snapshot.open_questions {
        println!("  open {}: {}", question.id, question.text);
    }
    for bug in &snapshot.recent_bugs {
        println!("  {}: {}", bug.id, bug.text);
    }
    if let Some(score) = snapshot.final_score {
        println!("  final score: {score:.1}");
    }
}

async fn run_command_turn(api: &mut EngineApi, command: Option<String>) {
    if let Some(command) = command {
        let parsed = api.enqueue_command(command);
        println!("queued {} command", parsed.kind());
    }
    let (status, completed) = api.advance_weeks(1).await;
    println!("completed={completed} {status}");
    print_snapshot(&api.snapshot());
}

async fn run_simulation(args: &[String]) -> Result<(), String> {
    let weeks = args
        .get(2)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid weeks: {value}"))
        })
        .transpose()?
        .unwrap_or(52);
    let seed = args
        .get(3)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid seed: {value}"))
        })
        .transpose()?;

    let mut config = StudioConfig::default();
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let mut api = EngineApi::with_collaborators(
        config,
        Arc::new(FallbackTextClient),
        Box::new(SeededRandom::new(seed)),
    );

    for _ in 0..weeks {
        let (_, completed) = api.advance_weeks(1).await;
        if completed == 0 {
            break;
        }
        println!("{}", api.snapshot().status_line);
    }

    let snapshot = api.snapshot();
    if let Some(score) = snapshot.final_score {
        println!("released with final score {score:.1}");
    } else {
        println!(
            "not released after {} week(s): build {:.1}%",
            snapshot.current_week - 1,
            snapshot.build_progress
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("status") => {
            let api = EngineApi::from_config(StudioConfig::default());
            println!("{}", api.status());
            print_snapshot(&api.snapshot());
        }
        Some("turn") => {
            let weeks = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
            let mut api = EngineApi::from_config(StudioConfig::default());
            let (status, completed) = api.advance_weeks(weeks).await;
            println!("completed={completed} {status}");
            print_snapshot(&api.snapshot());
        }
        Some("declare") => {
            let text = args[2..].join(" ");
            if text.is_empty() {
                eprintln!("error: missing design directive");
                print_usage();
                std::process::exit(2);
            }
            let mut api = EngineApi::from_config(StudioConfig::default());
            run_command_turn(&mut api, Some(format!("/declare {text}"))).await;
        }
        Some("answer") => {
            if args.len() < 4 {
                eprintln!("error: answer needs a question id and text");
                print_usage();
                std::process::exit(2);
            }
            let mut api = EngineApi::from_config(StudioConfig::default());
            run_command_turn(&mut api, Some(format!("/answer {}", args[2..].join(" ")))).await;
        }
        Some("simulate") => {
            if let Err(err) = run_simulation(&args).await {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving api on http://{addr}");
                if let Err(err) = serve(addr).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        _ => {
            print_usage();
        }
    }
}
