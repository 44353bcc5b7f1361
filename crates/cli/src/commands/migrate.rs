use scoreline_db::migrations;

use crate::commands::{load_config, open_database, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("migrate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let versions = migrations::applied_versions(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok(versions)
    });

    match result {
        Ok(versions) => {
            let listed = versions.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
            CommandResult::success("migrate", format!("applied pending migrations (schema at [{listed}])"))
        }
        Err(failure) => CommandResult::from_step("migrate", failure),
    }
}
