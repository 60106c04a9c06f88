use crate::commands::{
    load_config, open_database, runtime, CommandResult, Failure, EXIT_MIGRATION, EXIT_VERIFICATION,
};
use sitequote_db::{CatalogSeed, SeedResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let run_result = async {
            let seeded = CatalogSeed::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

            let verification = CatalogSeed::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

            if verification.all_present {
                Ok::<SeedResult, Failure>(seeded)
            } else {
                Err((
                    "seed_verification",
                    verification_message(&verification.failed_checks()),
                    EXIT_VERIFICATION,
                ))
            }
        }
        .await;

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", success_message(&seeded)),
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn success_message(seeded: &SeedResult) -> String {
    format!(
        "seeded {} catalog documents into `{}` ({})",
        seeded.documents_seeded, seeded.collection, seeded.dataset_version
    )
}

fn verification_message(failed: &[&str]) -> String {
    if failed.is_empty() {
        "some seed documents failed to load".to_string()
    } else {
        format!("seed verification failed for documents: {}", failed.join(", "))
    }
}
