use agent_orchestrator::{
    capability::create_default_registry, executor::Executor, orchestrator::Orchestrator,
    planner::RulePlanner, RunConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Task orchestrator starting");

    let orchestrator = Orchestrator::new(
        Box::new(RulePlanner),
        Executor::new(create_default_registry()),
    );

    let goal = std::env::args().nth(1).unwrap_or_else(|| {
        "Create a short briefing on gold vs. Nasdaq divergence and save a note.".to_string()
    });
    let config = RunConfig::default();

    let record = orchestrator.run(&goal, &config).await;

    println!("\n=== RUN {} ===", record.run_id);
    println!("Goal: {}", record.goal);
    println!("Steps planned: {}", record.plan.steps.len());
    for log in &record.logs {
        let status = if log.verified { "ok" } else { "FAIL" };
        println!(
            "  [{}] step {}: {} -> {} ms, {} attempt(s) -> {}",
            status,
            log.step_id,
            log.capability,
            log.duration_ms,
            log.attempt_count,
            log.verification_message
        );
    }
    println!("Verdict: {}", record.verdict.message);

    println!("\n=== RUN RECORD ===");
    println!("{}", serde_json::to_string_pretty(&record)?);

    if record.verdict.passed {
        Ok(())
    } else {
        Err(format!("run blocked: {}", record.verdict.message).into())
    }
}
