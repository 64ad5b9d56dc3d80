use anyhow::Result;

use mission_agents::AgentDirectory;
use mission_config::MissionConfig;
use mission_cron::CronStore;
use mission_storage::TaskStore;

/// Print resolved paths and document counts.
pub fn run_health(config: &MissionConfig) -> Result<()> {
    let cron = CronStore::new(config.cron_jobs_path());
    let tasks = TaskStore::new(config.tasks_path());
    let agents = AgentDirectory::new(config.sessions_root());

    println!("mission-control is healthy");
    println!(
        "  listen address: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("  auth user: {}", config.gateway.username);
    if config.uses_default_password() {
        println!("  warning: default password in use");
    }
    let jobs = cron.list_jobs();
    println!(
        "  cron jobs: {} ({} enabled) ({})",
        jobs.len(),
        jobs.iter().filter(|job| job.enabled()).count(),
        cron.path().display()
    );
    println!(
        "  tasks: {} ({})",
        tasks.list().tasks.len(),
        tasks.path().display()
    );
    match agents.list_agents() {
        Ok(list) => println!(
            "  agents: {} ({})",
            list.len(),
            agents.root().display()
        ),
        Err(e) => println!(
            "  agents: unreadable ({}): {e}",
            agents.root().display()
        ),
    }
    println!("  public dir: {}", config.paths.public_dir.display());
    println!("  data dir: {}", config.paths.data_dir.display());

    Ok(())
}
