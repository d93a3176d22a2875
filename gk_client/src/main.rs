//! Command-line client for the session auth server.

use anyhow::{Context, Result};
use gk_client::{ApiClient, CacheState, SessionCache};
use pico_args::Arguments;

const HELP: &str = "\
Talk to a session authentication server

USAGE:
  gk_client [OPTIONS] COMMAND

COMMANDS:
  sign-up                  Register an account and print the signed-in user
  sign-in                  Sign in and print the session state
  session                  Print the current session state (requires sign-in
                           in the same invocation; cookies are not persisted)

OPTIONS:
  --server     URL         Server base URL  [default: env GK_SERVER or http://127.0.0.1:8080]
  --email      EMAIL       Account email (required for sign-up/sign-in)
  --password   PASSWORD    Account password (required for sign-up/sign-in)
  --name       NAME        Display name (sign-up only)

FLAGS:
  -h, --help               Print help information
";

struct Args {
    server: String,
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    command: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        server: pargs
            .opt_value_from_str("--server")?
            .or_else(|| std::env::var("GK_SERVER").ok())
            .unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
        email: pargs.opt_value_from_str("--email")?,
        password: pargs.opt_value_from_str("--password")?,
        name: pargs.opt_value_from_str("--name")?,
        command: pargs.opt_free_from_str()?,
    };

    let client = ApiClient::new(args.server)?;

    match args.command.as_deref() {
        Some("sign-up") => {
            let email = args.email.context("--email is required for sign-up")?;
            let password = args.password.context("--password is required for sign-up")?;
            let user = client.sign_up(args.name, email, password).await?;
            println!("signed up as {} ({})", user.email, user.id);
            print_session(&client).await
        }
        Some("sign-in") => {
            let email = args.email.context("--email is required for sign-in")?;
            let password = args.password.context("--password is required for sign-in")?;
            let user = client.sign_in(email, password).await?;
            println!("signed in as {} ({})", user.email, user.id);
            print_session(&client).await
        }
        Some("session") => print_session(&client).await,
        Some(other) => anyhow::bail!("unknown command: {other} (see --help)"),
        None => {
            print!("{HELP}");
            Ok(())
        }
    }
}

async fn print_session(client: &ApiClient) -> Result<()> {
    let cache = SessionCache::new();
    match cache.refresh(client).await {
        CacheState::Ready(Some(data)) => {
            println!(
                "session {} for {} expires at {}",
                data.session.id, data.user.email, data.session.expires_at
            );
        }
        CacheState::Ready(None) => println!("no active session"),
        CacheState::Error(e) => println!("session lookup failed: {e}"),
        // refresh always settles the cache
        CacheState::Loading => {}
    }
    Ok(())
}
