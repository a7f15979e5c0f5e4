//! Seed-admin command - creates an administrator account.

use crate::cli::args::SeedAdminArgs;
use crate::config::{Config, ROLE_ADMIN};
use crate::domain::Password;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

/// Execute the seed-admin command
pub async fn execute(args: SeedAdminArgs, config: Config) -> AppResult<()> {
    if !Password::meets_policy(&args.password) {
        return Err(AppError::WeakPassword);
    }

    let db = Database::connect(&config).await;
    let persistence = Persistence::new(db.get_connection());

    if persistence
        .accounts()
        .find_by_username(&args.username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Account"));
    }

    let digest = Password::new(&args.password)?.into_string();
    let account = persistence
        .accounts()
        .create(args.username, digest, ROLE_ADMIN.to_string(), None)
        .await?;

    tracing::info!(username = %account.username, "administrator account created");
    println!("Administrator account '{}' created", account.username);

    Ok(())
}
