use super::report::{Store, build_store, print_routes, print_session};
use crate::app_lib::AppConfig;
use crate::features::auth::{LoginAttempt, LoginError, LoginFlow, LoginOutcome};
use anyhow::Result;
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub email: String,
    pub password: SecretString,
    pub remember_me: bool,
    pub totp_code: Option<String>,
    pub visits: Vec<String>,
    pub logout: bool,
}

/// Bootstraps, signs in (asking for an authenticator code on stdin when the
/// account has a second factor), resolves the requested routes, and
/// optionally signs out again.
///
/// # Errors
/// Returns an error if the login is refused, input is invalid outside the
/// code prompt, or stdin closes while a code is pending.
pub async fn execute(args: Args) -> Result<()> {
    debug!(api = %args.config.api_base_url, "Starting login");
    let store = build_store(args.config)?;
    store.bootstrap().await;
    if store.snapshot().is_authenticated() {
        debug!("Existing session found, signing in again");
    }

    let mut attempt = LoginAttempt::new(args.email, args.password).remember_me(args.remember_me);
    if let Some(code) = args.totp_code {
        attempt = attempt.totp_code(code);
    }

    let landing = sign_in(&store, attempt, args.remember_me).await?;
    println!("signed in, landing on {landing}");

    let session = store.snapshot();
    print_session(&session);
    print_routes(&session, &args.visits);

    if args.logout {
        store.logout().await;
        let session = store.snapshot();
        print_session(&session);
        print_routes(&session, &args.visits);
    }

    Ok(())
}

async fn sign_in(store: &Store, attempt: LoginAttempt, remember_me: bool) -> Result<&'static str> {
    let mut flow = LoginFlow::new(store.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut outcome = flow.login(attempt).await;
    loop {
        match outcome {
            Ok(LoginOutcome::Authenticated { landing }) => return Ok(landing),
            Ok(LoginOutcome::SecondFactorRequired { notice }) => eprintln!("{notice}"),
            Err(LoginError::Validation(errors)) if flow.stage().is_second_factor() => {
                eprintln!("{errors}");
            }
            Ok(LoginOutcome::Discarded) => anyhow::bail!("login abandoned"),
            Err(err) => anyhow::bail!("login failed: {}", err.into_form_errors()),
        }

        let Some(code) = read_code(&mut lines).await? else {
            flow.reset();
            anyhow::bail!("no authenticator code entered");
        };
        outcome = flow.submit_code(&code, remember_me).await;
    }
}

async fn read_code(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    eprint!("Authenticator code: ");
    std::io::stderr().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}
