//! `user-management` CLI: migrations plus user and group administration.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PER_PAGE, PageRequest};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use user_management::config::StoreSettings;
use user_management::domain::{
    Error, GroupName, GroupService, NewGroup, NewUser, RecordKey, RecordKeyGenerator,
    UserListQuery, UserService,
};
use user_management::outbound::persistence::{
    DbPool, DieselGroupRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};

/// `user-management` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "user-management",
    about = "Manage users and groups stored in PostgreSQL",
    version
)]
struct Cli {
    /// Database connection URL. Overrides `USER_MANAGEMENT_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// User operations.
    #[command(subcommand)]
    User(UserCommand),
    /// Group operations.
    #[command(subcommand)]
    Group(GroupCommand),
}

#[derive(Debug, Args)]
struct UserFields {
    /// Display name.
    #[arg(long)]
    name: String,
    /// Contact email.
    #[arg(long)]
    email: String,
    /// Store the user as inactive.
    #[arg(long)]
    inactive: bool,
}

impl UserFields {
    fn into_draft(self) -> Result<NewUser, Error> {
        Ok(NewUser::try_from_strings(self.name, self.email)?.with_active(!self.inactive))
    }
}

#[derive(Debug, Args)]
struct PageArgs {
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: u64,
    /// Items per page, clamped to 1..=100.
    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
    per_page: u64,
}

impl PageArgs {
    fn request(&self) -> PageRequest {
        PageRequest::clamped(self.page, self.per_page)
    }
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create a user.
    Create(UserFields),
    /// Show a user.
    Get { id: String },
    /// List users, optionally filtered by a search term.
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Case-insensitive substring of the name or email.
        #[arg(long)]
        search: Option<String>,
    },
    /// Replace every field of a user.
    Update {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user. Group memberships are left in place.
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum GroupCommand {
    /// Create a group.
    Create {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Initial member identifiers. Not checked against users.
        #[arg(long = "member", value_name = "user-id")]
        members: Vec<String>,
    },
    /// Show a group.
    Get { id: String },
    /// List groups.
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Rename a group.
    Rename {
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a group.
    Delete { id: String },
    /// Add an existing user to a group.
    AddMember { group_id: String, user_id: String },
    /// Remove a user from a group.
    RemoveMember { group_id: String, user_id: String },
    /// Remove members whose user no longer exists.
    Prune { group_id: String },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let cli = Cli::try_parse().map_err(io::Error::other)?;
    let config = load_pool_config(cli.database_url.as_deref())?;

    if matches!(cli.command, Command::Migrate) {
        let url = config.database_url().to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
            .map_err(io::Error::other)?;
        return emit(&applied);
    }

    let pool = DbPool::new(config)
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let keys = Arc::new(RecordKeyGenerator::default());
    let users = Arc::new(DieselUserRepository::new(pool.clone(), Arc::clone(&keys)));
    let groups = Arc::new(DieselGroupRepository::new(pool, keys));

    match cli.command {
        Command::Migrate => Ok(()),
        Command::User(command) => run_user(UserService::new(users), command).await,
        Command::Group(command) => run_group(GroupService::new(groups, users), command).await,
    }
}

/// Load `USER_MANAGEMENT_*` settings and resolve the pool configuration.
fn load_pool_config(database_url: Option<&str>) -> io::Result<PoolConfig> {
    let settings = StoreSettings::load_from_iter([OsString::from("user-management")])
        .map_err(|error| io::Error::other(format!("load store settings: {error}")))?;
    let config = settings
        .pool_config(database_url)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    config
        .validate()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    Ok(config)
}

async fn run_user(
    service: UserService<DieselUserRepository>,
    command: UserCommand,
) -> io::Result<()> {
    match command {
        UserCommand::Create(fields) => {
            let draft = fields.into_draft().map_err(domain_failure)?;
            emit(&service.create(draft).await.map_err(domain_failure)?)
        }
        UserCommand::Get { id } => emit(&service.get(&id).await.map_err(domain_failure)?),
        UserCommand::List { page, search } => {
            let mut query = UserListQuery::new(page.request());
            query.search = search;
            emit(&service.list(&query).await.map_err(domain_failure)?)
        }
        UserCommand::Update { id, fields } => {
            let draft = fields.into_draft().map_err(domain_failure)?;
            emit(&service.update(&id, draft).await.map_err(domain_failure)?)
        }
        UserCommand::Delete { id } => {
            service.delete(&id).await.map_err(domain_failure)?;
            emit(&serde_json::json!({ "deleted": id }))
        }
    }
}

async fn run_group(
    service: GroupService<DieselGroupRepository, DieselUserRepository>,
    command: GroupCommand,
) -> io::Result<()> {
    match command {
        GroupCommand::Create { name, members } => {
            let draft = group_draft(name, &members).map_err(domain_failure)?;
            emit(&service.create(draft).await.map_err(domain_failure)?)
        }
        GroupCommand::Get { id } => emit(&service.get(&id).await.map_err(domain_failure)?),
        GroupCommand::List { page } => {
            emit(&service.list(page.request()).await.map_err(domain_failure)?)
        }
        GroupCommand::Rename { id, name } => {
            let name = GroupName::new(name)
                .map_err(Error::from)
                .map_err(domain_failure)?;
            emit(&service.rename(&id, name).await.map_err(domain_failure)?)
        }
        GroupCommand::Delete { id } => {
            service.delete(&id).await.map_err(domain_failure)?;
            emit(&serde_json::json!({ "deleted": id }))
        }
        GroupCommand::AddMember { group_id, user_id } => {
            service
                .add_member(&group_id, &user_id)
                .await
                .map_err(domain_failure)?;
            emit(&serde_json::json!({ "group": group_id, "added": user_id }))
        }
        GroupCommand::RemoveMember { group_id, user_id } => {
            service
                .remove_member(&group_id, &user_id)
                .await
                .map_err(domain_failure)?;
            emit(&serde_json::json!({ "group": group_id, "removed": user_id }))
        }
        GroupCommand::Prune { group_id } => {
            let pruned = service
                .prune_dangling_members(&group_id)
                .await
                .map_err(domain_failure)?;
            emit(&serde_json::json!({ "group": group_id, "pruned": pruned }))
        }
    }
}

fn group_draft(name: String, members: &[String]) -> Result<NewGroup, Error> {
    let name = GroupName::new(name)?;
    let members = members
        .iter()
        .map(|raw| {
            RecordKey::decode(raw)
                .map_err(|error| Error::invalid_request(format!("member {raw:?}: {error}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NewGroup::new(name).with_members(members))
}

fn emit(value: &impl Serialize) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| io::Error::other(format!("render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn domain_failure(error: Error) -> io::Error {
    let rendered = serde_json::to_string(&error).unwrap_or_else(|_| error.to_string());
    io::Error::other(rendered)
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use clap::CommandFactory;
    use env_lock::lock_env;
    use rstest::rstest;
    use user_management::domain::ErrorCode;

    use super::*;

    #[rstest]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn list_arguments_are_clamped() {
        let cli = Cli::try_parse_from(["user-management", "user", "list", "--per-page", "500"])
            .expect("arguments parse");
        let Command::User(UserCommand::List { page, search }) = cli.command else {
            panic!("expected user list command");
        };
        assert_eq!(page.request().per_page(), 100);
        assert!(search.is_none());
    }

    #[rstest]
    fn group_draft_rejects_malformed_members() {
        let error = group_draft("Admins".to_owned(), &["invalid-id".to_owned()])
            .expect_err("malformed member");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn group_draft_collapses_duplicate_members() {
        let member = "000000000000000000000001".to_owned();
        let draft =
            group_draft("Admins".to_owned(), &[member.clone(), member]).expect("valid draft");
        assert_eq!(draft.members.len(), 1);
    }

    #[rstest]
    fn inactive_flag_is_applied() {
        let cli = Cli::try_parse_from([
            "user-management",
            "--database-url",
            "postgres://localhost/users",
            "user",
            "create",
            "--name",
            "Alice Johnson",
            "--email",
            "alice@example.com",
            "--inactive",
        ])
        .expect("arguments parse");
        assert_eq!(cli.database_url.as_deref(), Some("postgres://localhost/users"));
        let Command::User(UserCommand::Create(fields)) = cli.command else {
            panic!("expected user create command");
        };
        let draft = fields.into_draft().expect("valid draft");
        assert!(!draft.is_active);
    }

    const STORE_VARS: [&str; 5] = [
        "USER_MANAGEMENT_DATABASE_URL",
        "USER_MANAGEMENT_MAX_CONNECTIONS",
        "USER_MANAGEMENT_MIN_IDLE",
        "USER_MANAGEMENT_CONNECT_TIMEOUT_SECS",
        "USER_MANAGEMENT_QUERY_TIMEOUT_MS",
    ];

    #[rstest]
    fn pool_config_loads_from_environment() {
        let _guard = lock_env([
            (
                "USER_MANAGEMENT_DATABASE_URL",
                Some("postgres://env/users".to_owned()),
            ),
            ("USER_MANAGEMENT_MAX_CONNECTIONS", Some("1".to_owned())),
            ("USER_MANAGEMENT_MIN_IDLE", None),
            ("USER_MANAGEMENT_CONNECT_TIMEOUT_SECS", None),
            ("USER_MANAGEMENT_QUERY_TIMEOUT_MS", None),
        ]);

        let config = load_pool_config(None).expect("single connection pool is usable");
        assert_eq!(config.database_url(), "postgres://env/users");
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    fn missing_database_url_is_invalid_input() {
        let _guard = lock_env(STORE_VARS.map(|name| (name, None::<String>)));

        let error = load_pool_config(None).expect_err("no url configured");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        let config = load_pool_config(Some("postgres://flag/users")).expect("flag supplies url");
        assert_eq!(config.database_url(), "postgres://flag/users");
    }
}
